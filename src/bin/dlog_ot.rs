use std::sync::Arc;

use clap::{Parser, Subcommand};
use dlog_protocols::config::Backend;
use dlog_protocols::groups::{native, EcF2mGroup, EcFpGroup, NativeP256Group, Rfc5114Group, ZpGroup};
use dlog_protocols::ot::ByteArrayPayload;
use dlog_protocols::params::GroupParameters;
use dlog_protocols::{
    BuiltinParameters, DlogGroup, OtBatchReceiver, OtBatchSender, OtReceiverInput, OtSenderInput,
    ParameterSource, ProtocolConfig, TcpChannel,
};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser, Debug)]
#[command(name = "dlog-ot")]
#[command(about = "Oblivious transfer of byte strings over TCP", long_about = None)]
#[command(version)]
struct Args {
    /// Host to bind to (sender) or connect to (receiver)
    #[arg(short = 'H', long, env = "DLOG_HOST")]
    host: Option<String>,

    /// Port to listen on or connect to
    #[arg(short, long, env = "DLOG_PORT")]
    port: Option<u16>,

    #[command(subcommand)]
    role: RoleCommand,
}

#[derive(Subcommand, Debug)]
enum RoleCommand {
    /// Wait for one receiver and offer message pairs
    Sender {
        /// A pair as `left:right`; repeat for a batch
        #[arg(long = "pair", required = true)]
        pairs: Vec<String>,
    },
    /// Connect to a sender and learn one message of each pair
    Receiver {
        /// Selection bit (0 or 1); repeat for a batch
        #[arg(long = "choice", required = true)]
        choices: Vec<u8>,
    },
}

fn parse_pairs(pairs: &[String]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, String> {
    pairs
        .iter()
        .map(|pair| {
            pair.split_once(':')
                .map(|(l, r)| (l.as_bytes().to_vec(), r.as_bytes().to_vec()))
                .ok_or_else(|| format!("pair {pair:?} is not of the form left:right"))
        })
        .collect()
}

async fn run<G: DlogGroup>(
    group: Arc<G>,
    config: &ProtocolConfig,
    role: &RoleCommand,
) -> Result<(), Box<dyn std::error::Error>> {
    let addr = config.transport.addr();
    let level = config.ot.security;
    let bits = config.sigma.soundness_bits;
    info!(group = group.name(), %level, soundness_bits = bits, "starting OT");

    match role {
        RoleCommand::Sender { pairs } => {
            let input = OtSenderInput::new(parse_pairs(pairs)?)?;
            let sender = OtBatchSender::new(group, ByteArrayPayload, level, bits)?;
            let listener = TcpListener::bind(&addr).await?;
            info!(%addr, "waiting for a receiver");
            let (stream, peer) = listener.accept().await?;
            info!(%peer, "receiver connected");
            let mut channel =
                TcpChannel::new(stream).with_max_frame_len(config.transport.max_frame_len);
            sender.transfer(&mut channel, &input).await?;
            info!(transfers = input.len(), "transfer complete");
        }
        RoleCommand::Receiver { choices } => {
            let input = OtReceiverInput::from_bits(choices)?;
            let receiver = OtBatchReceiver::new(group, ByteArrayPayload, level, bits)?;
            let mut channel = TcpChannel::connect(&addr)
                .await?
                .with_max_frame_len(config.transport.max_frame_len);
            info!(%addr, "connected to sender");
            let output = receiver.transfer(&mut channel, &input).await?;
            for (i, value) in output.values.iter().enumerate() {
                println!("{i}: {}", String::from_utf8_lossy(value));
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = ProtocolConfig::from_env().unwrap_or_else(|e| {
        error!("Failed to load configuration: {e}");
        info!("Using default configuration");
        ProtocolConfig::default()
    });
    if let Some(host) = args.host {
        config.transport.host = host;
    }
    if let Some(port) = args.port {
        config.transport.port = port;
    }

    if let Err(e) = config.validate() {
        error!("Configuration validation failed: {e}");
        return Err(format!("Invalid configuration: {e}").into());
    }

    let name = config.group.name.as_str();
    let result = match config.group.backend {
        Backend::Native => {
            native::initialize()?;
            run(Arc::new(NativeP256Group::new()?), &config, &args.role).await
        }
        Backend::FixedWidth => run(Arc::new(Rfc5114Group::new()?), &config, &args.role).await,
        Backend::Software => match BuiltinParameters.lookup(name)? {
            GroupParameters::Zp(params) => {
                run(Arc::new(ZpGroup::new(params)?), &config, &args.role).await
            }
            GroupParameters::EcFp(params) => {
                run(Arc::new(EcFpGroup::new(params)?), &config, &args.role).await
            }
            GroupParameters::EcF2m(params) => {
                run(Arc::new(EcF2mGroup::new(params)?), &config, &args.role).await
            }
        },
    };

    if let Err(e) = &result {
        error!("OT failed: {e}");
    }
    result
}
