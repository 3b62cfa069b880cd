//! Group parameter bundles and the named-parameter registry.

use num_bigint::BigUint;

use crate::{Error, Result};

/// Parameters of a prime-order subgroup of `Z_p^*`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ZpParams {
    pub name: String,
    /// Field modulus.
    pub p: BigUint,
    /// Subgroup order, dividing `p - 1`.
    pub q: BigUint,
    /// Subgroup generator.
    pub g: BigUint,
}

/// Parameters of a short Weierstrass curve `y^2 = x^3 + ax + b` over GF(p).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EcFpParams {
    pub name: String,
    pub p: BigUint,
    pub a: BigUint,
    pub b: BigUint,
    pub gx: BigUint,
    pub gy: BigUint,
    /// Prime order of the generator.
    pub q: BigUint,
    pub cofactor: BigUint,
}

/// Parameters of a curve `y^2 + xy = x^3 + ax^2 + b` over GF(2^m).
///
/// Field elements are given as integers whose bits are polynomial
/// coefficients.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EcF2mParams {
    pub name: String,
    pub m: usize,
    /// Exponents of the reduction polynomial other than `m`.
    pub terms: Vec<usize>,
    pub a: BigUint,
    pub b: BigUint,
    pub gx: BigUint,
    pub gy: BigUint,
    pub q: BigUint,
    pub cofactor: BigUint,
}

/// A parsed parameter bundle of any group family.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GroupParameters {
    Zp(ZpParams),
    EcFp(EcFpParams),
    EcF2m(EcF2mParams),
}

/// Supplies named group parameters.
pub trait ParameterSource {
    /// Looks up a bundle by name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedGroup`] for unknown names.
    fn lookup(&self, name: &str) -> Result<GroupParameters>;

    fn zp(&self, name: &str) -> Result<ZpParams> {
        match self.lookup(name)? {
            GroupParameters::Zp(params) => Ok(params),
            _ => Err(Error::UnsupportedGroup(format!("{name} is not a Zp group"))),
        }
    }

    fn ec_fp(&self, name: &str) -> Result<EcFpParams> {
        match self.lookup(name)? {
            GroupParameters::EcFp(params) => Ok(params),
            _ => Err(Error::UnsupportedGroup(format!(
                "{name} is not a curve over a prime field"
            ))),
        }
    }

    fn ec_f2m(&self, name: &str) -> Result<EcF2mParams> {
        match self.lookup(name)? {
            GroupParameters::EcF2m(params) => Ok(params),
            _ => Err(Error::UnsupportedGroup(format!(
                "{name} is not a curve over a binary field"
            ))),
        }
    }
}

/// Standard groups compiled into the library.
#[derive(Clone, Copy, Debug, Default)]
pub struct BuiltinParameters;

impl BuiltinParameters {
    /// Every name [`lookup`](ParameterSource::lookup) accepts.
    pub const NAMES: [&'static str; 10] = [
        RFC5114_2048_256,
        RFC3526_2048,
        "P-192",
        "P-224",
        "P-256",
        "P-384",
        "secp256k1",
        "K-163",
        "K-233",
        "B-233",
    ];
}

/// RFC 5114 section 2.3: 2048-bit MODP group with a 256-bit prime order subgroup.
pub const RFC5114_2048_256: &str = "RFC5114-2048-256";
/// RFC 3526 group 14, generator 2 of the quadratic residues.
pub const RFC3526_2048: &str = "RFC3526-2048";

pub(crate) const RFC5114_P: &str = "87A8E61DB4B6663CFFBBD19C651959998CEEF608660DD0F25D2CEED4435E3B00E00DF8F1D61957D4FAF7DF4561B2AA3016C3D91134096FAA3BF4296D830E9A7C209E0C6497517ABD5A8A9D306BCF67ED91F9E6725B4758C022E0B1EF4275BF7B6C5BFC11D45F9088B941F54EB1E59BB8BC39A0BF12307F5C4FDB70C581B23F76B63ACAE1CAA6B7902D52526735488A0EF13C6D9A51BFA4AB3AD8347796524D8EF6A167B5A41825D967E144E5140564251CCACB83E6B486F6B3CA3F7971506026C0B857F689962856DED4010ABD0BE621C3A3960A54E710C375F26375D7014103A4B54330C198AF126116D2276E11715F693877FAD7EF09CADB094AE91E1A1597";
pub(crate) const RFC5114_Q: &str =
    "8CF83642A709A097B447997640129DA299B1A47D1EB3750BA308B0FE64F5FBD3";
pub(crate) const RFC5114_G: &str = "3FB32C9B73134D0B2E77506660EDBD484CA7B18F21EF205407F4793A1A0BA12510DBC15077BE463FFF4FED4AAC0BB555BE3A6C1B0C6B47B1BC3773BF7E8C6F62901228F8C28CBB18A55AE31341000A650196F931C77A57F2DDF463E5E9EC144B777DE62AAAB8A8628AC376D282D6ED3864E67982428EBC831D14348F6F2F9193B5045AF2767164E1DFC967C1FB3F2E55A4BD1BFFE83B9C80D052B985D182EA0ADB2A3B7313D3FE14C8484B1E052588B9B7D2BBD2DF016199ECD06E1557CD0915B3353BBB64E0EC377FD028370DF92B52C7891428CDC67EB6184B523D1DB246C32F63078490F00EF8D647D148D47954515E2327CFEF98C582664B4C0F6CC41659";

const RFC3526_P: &str = "FFFFFFFFFFFFFFFFC90FDAA22168C234C4C6628B80DC1CD129024E088A67CC74020BBEA63B139B22514A08798E3404DDEF9519B3CD3A431B302B0A6DF25F14374FE1356D6D51C245E485B576625E7EC6F44C42E9A637ED6B0BFF5CB6F406B7EDEE386BFB5A899FA5AE9F24117C4B1FE649286651ECE45B3DC2007CB8A163BF0598DA48361C55D39A69163FA8FD24CF5F83655D23DCA3AD961C62F356208552BB9ED529077096966D670C354E4ABC9804F1746C08CA18217C32905E462E36CE3BE39E772C180E86039B2783A2EC07A28FB5C55DF06F4C52C9DE2BCBF6955817183995497CEA956AE515D2261898FA051015728E5A8AACAA68FFFFFFFFFFFFFFFF";

pub(crate) const P256_ORDER: &str =
    "FFFFFFFF00000000FFFFFFFFFFFFFFFFBCE6FAADA7179E84F3B9CAC2FC632551";

struct NamedCurve {
    p: &'static str,
    a: &'static str,
    b: &'static str,
    gx: &'static str,
    gy: &'static str,
    q: &'static str,
}

const P192: NamedCurve = NamedCurve {
    p: "FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEFFFFFFFFFFFFFFFF",
    a: "FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEFFFFFFFFFFFFFFFC",
    b: "64210519E59C80E70FA7E9AB72243049FEB8DEECC146B9B1",
    gx: "188DA80EB03090F67CBF20EB43A18800F4FF0AFD82FF1012",
    gy: "07192B95FFC8DA78631011ED6B24CDD573F977A11E794811",
    q: "FFFFFFFFFFFFFFFFFFFFFFFF99DEF836146BC9B1B4D22831",
};

const P224: NamedCurve = NamedCurve {
    p: "FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF000000000000000000000001",
    a: "FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEFFFFFFFFFFFFFFFFFFFFFFFE",
    b: "B4050A850C04B3ABF54132565044B0B7D7BFD8BA270B39432355FFB4",
    gx: "B70E0CBD6BB4BF7F321390B94A03C1D356C21122343280D6115C1D21",
    gy: "BD376388B5F723FB4C22DFE6CD4375A05A07476444D5819985007E34",
    q: "FFFFFFFFFFFFFFFFFFFFFFFFFFFF16A2E0B8F03E13DD29455C5C2A3D",
};

const P256: NamedCurve = NamedCurve {
    p: "FFFFFFFF00000001000000000000000000000000FFFFFFFFFFFFFFFFFFFFFFFF",
    a: "FFFFFFFF00000001000000000000000000000000FFFFFFFFFFFFFFFFFFFFFFFC",
    b: "5AC635D8AA3A93E7B3EBBD55769886BC651D06B0CC53B0F63BCE3C3E27D2604B",
    gx: "6B17D1F2E12C4247F8BCE6E563A440F277037D812DEB33A0F4A13945D898C296",
    gy: "4FE342E2FE1A7F9B8EE7EB4A7C0F9E162BCE33576B315ECECBB6406837BF51F5",
    q: P256_ORDER,
};

const P384: NamedCurve = NamedCurve {
    p: "FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEFFFFFFFF0000000000000000FFFFFFFF",
    a: "FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEFFFFFFFF0000000000000000FFFFFFFC",
    b: "B3312FA7E23EE7E4988E056BE3F82D19181D9C6EFE8141120314088F5013875AC656398D8A2ED19D2A85C8EDD3EC2AEF",
    gx: "AA87CA22BE8B05378EB1C71EF320AD746E1D3B628BA79B9859F741E082542A385502F25DBF55296C3A545E3872760AB7",
    gy: "3617DE4A96262C6F5D9E98BF9292DC29F8F41DBD289A147CE9DA3113B5F0B8C00A60B1CE1D7E819D7A431D7C90EA0E5F",
    q: "FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFC7634D81F4372DDF581A0DB248B0A77AECEC196ACCC52973",
};

const SECP256K1: NamedCurve = NamedCurve {
    p: "FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEFFFFFC2F",
    a: "0",
    b: "7",
    gx: "79BE667EF9DCBBAC55A06295CE870B07029BFCDB2DCE28D959F2815B16F81798",
    gy: "483ADA7726A3C4655DA4FBFC0E1108A8FD17B448A68554199C47D08FFB10D4B8",
    q: "FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEBAAEDCE6AF48A03BBFD25E8CD0364141",
};

struct NamedBinaryCurve {
    m: usize,
    terms: &'static [usize],
    a: &'static str,
    b: &'static str,
    gx: &'static str,
    gy: &'static str,
    q: &'static str,
    cofactor: u32,
}

const K163: NamedBinaryCurve = NamedBinaryCurve {
    m: 163,
    terms: &[7, 6, 3, 0],
    a: "1",
    b: "1",
    gx: "02FE13C0537BBC11ACAA07D793DE4E6D5E5C94EEE8",
    gy: "0289070FB05D38FF58321F2E800536D538CCDAA3D9",
    q: "04000000000000000000020108A2E0CC0D99F8A5EF",
    cofactor: 2,
};

const K233: NamedBinaryCurve = NamedBinaryCurve {
    m: 233,
    terms: &[74, 0],
    a: "0",
    b: "1",
    gx: "017232BA853A7E731AF129F22FF4149563A419C26BF50A4C9D6EEFAD6126",
    gy: "01DB537DECE819B7F70F555A67C427A8CD9BF18AEB9B56E0C11056FAE6A3",
    q: "8000000000000000000000000000069D5BB915BCD46EFB1AD5F173ABDF",
    cofactor: 4,
};

const B233: NamedBinaryCurve = NamedBinaryCurve {
    m: 233,
    terms: &[74, 0],
    a: "1",
    b: "0066647EDE6C332C7F8C0923BB58213B333B20E9CE4281FE115F7D8F90AD",
    gx: "00FAC9DFCBAC8313BB2139F1BB755FEF65BC391F8B36F8F8EB7371FD558B",
    gy: "01006A08A41903350678E58528BEBF8A0BEFF867A7CA36716F7E01F81052",
    q: "01000000000000000000000000000013E974E72F8A6922031D2603CFE0D7",
    cofactor: 2,
};

pub(crate) fn hex_int(hex: &str) -> BigUint {
    BigUint::parse_bytes(hex.as_bytes(), 16)
        .unwrap_or_else(|| unreachable!("built-in hex constants are valid: {hex}"))
}

fn prime_curve(name: &str, curve: &NamedCurve) -> EcFpParams {
    EcFpParams {
        name: name.to_string(),
        p: hex_int(curve.p),
        a: hex_int(curve.a),
        b: hex_int(curve.b),
        gx: hex_int(curve.gx),
        gy: hex_int(curve.gy),
        q: hex_int(curve.q),
        cofactor: BigUint::from(1u32),
    }
}

fn binary_curve(name: &str, curve: &NamedBinaryCurve) -> EcF2mParams {
    EcF2mParams {
        name: name.to_string(),
        m: curve.m,
        terms: curve.terms.to_vec(),
        a: hex_int(curve.a),
        b: hex_int(curve.b),
        gx: hex_int(curve.gx),
        gy: hex_int(curve.gy),
        q: hex_int(curve.q),
        cofactor: BigUint::from(curve.cofactor),
    }
}

impl ParameterSource for BuiltinParameters {
    fn lookup(&self, name: &str) -> Result<GroupParameters> {
        let params = match name {
            RFC5114_2048_256 => GroupParameters::Zp(ZpParams {
                name: name.to_string(),
                p: hex_int(RFC5114_P),
                q: hex_int(RFC5114_Q),
                g: hex_int(RFC5114_G),
            }),
            RFC3526_2048 => {
                let p = hex_int(RFC3526_P);
                let q = (&p - 1u32) >> 1;
                GroupParameters::Zp(ZpParams {
                    name: name.to_string(),
                    p,
                    q,
                    g: BigUint::from(2u32),
                })
            }
            "P-192" => GroupParameters::EcFp(prime_curve(name, &P192)),
            "P-224" => GroupParameters::EcFp(prime_curve(name, &P224)),
            "P-256" => GroupParameters::EcFp(prime_curve(name, &P256)),
            "P-384" => GroupParameters::EcFp(prime_curve(name, &P384)),
            "secp256k1" => GroupParameters::EcFp(prime_curve(name, &SECP256K1)),
            "K-163" => GroupParameters::EcF2m(binary_curve(name, &K163)),
            "K-233" => GroupParameters::EcF2m(binary_curve(name, &K233)),
            "B-233" => GroupParameters::EcF2m(binary_curve(name, &B233)),
            other => return Err(Error::UnsupportedGroup(other.to_string())),
        };
        Ok(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_listed_name_resolves() {
        for name in BuiltinParameters::NAMES {
            assert!(BuiltinParameters.lookup(name).is_ok(), "{name}");
        }
    }

    #[test]
    fn unknown_name_is_configuration_error() {
        let err = BuiltinParameters.lookup("P-521").unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Configuration);
    }

    #[test]
    fn family_mismatch_is_rejected() {
        assert!(BuiltinParameters.zp("P-256").is_err());
        assert!(BuiltinParameters.ec_fp("K-163").is_err());
        assert!(BuiltinParameters.ec_f2m(RFC5114_2048_256).is_err());
    }

    #[test]
    fn nist_prime_curves_use_a_minus_three() {
        for name in ["P-192", "P-224", "P-256", "P-384"] {
            let params = BuiltinParameters.ec_fp(name).unwrap();
            assert_eq!(&params.p - &params.a, BigUint::from(3u32));
        }
    }
}
