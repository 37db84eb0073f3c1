//! 暗号化バンドルのエンベロープ
//!
//! ```text
//! +-------+---------+--------+--------+--------+----------+-----------+------------+
//! | "JBX" | version | m_cost | t_cost | p_cost | salt(16) | nonce(24) | ciphertext |
//! |  3 B  |   1 B   | u32 LE | u32 LE | u32 LE |          |           |            |
//! +-------+---------+--------+--------+--------+----------+-----------+------------+
//! ```
//!
//! 鍵はパスフレーズから Argon2id で導出し、XChaCha20-Poly1305 で暗号化する。
//! 暗号文より前のヘッダ全体を AAD として認証する。

use argon2::{Algorithm, Argon2, Params, Version};
use chacha20poly1305::aead::{Aead, AeadCore, KeyInit, Payload};
use chacha20poly1305::{XChaCha20Poly1305, XNonce};
use rand::rngs::OsRng;
use rand::RngCore;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

pub const MAGIC: [u8; 3] = *b"JBX";
const VERSION: u8 = 1;
const SALT_LEN: usize = 16;
const NONCE_LEN: usize = 24;
const HEADER_LEN: usize = 3 + 1 + 4 * 3 + SALT_LEN + NONCE_LEN;
/// 1 GiB（KiB 単位）
const MAX_M_COST: u32 = 1 << 20;
const MAX_T_COST: u32 = 64;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvelopeError {
    #[error("encrypted bundle header is truncated")]
    Truncated,

    #[error("unsupported encrypted bundle version: {0}")]
    UnsupportedVersion(u8),

    #[error("unsupported key derivation parameters")]
    InvalidKdfParams,

    #[error("wrong passphrase or corrupted bundle")]
    Authentication,

    #[error("encryption failed")]
    Encryption,
}

/// 鍵導出パラメータ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    pub m_cost: u32,
    pub t_cost: u32,
    pub p_cost: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            m_cost: Params::DEFAULT_M_COST,
            t_cost: Params::DEFAULT_T_COST,
            p_cost: Params::DEFAULT_P_COST,
        }
    }
}

impl KdfParams {
    /// 上限と Argon2 の制約を確認（鍵導出はしない）
    fn params(&self) -> Result<Params, EnvelopeError> {
        if self.m_cost > MAX_M_COST || self.t_cost > MAX_T_COST {
            return Err(EnvelopeError::InvalidKdfParams);
        }
        Params::new(self.m_cost, self.t_cost, self.p_cost, Some(32))
            .map_err(|_| EnvelopeError::InvalidKdfParams)
    }

    fn argon2(&self) -> Result<Argon2<'static>, EnvelopeError> {
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params()?))
    }
}

#[derive(Zeroize, ZeroizeOnDrop)]
struct BundleKey([u8; 32]);

impl BundleKey {
    fn derive(secret: &str, salt: &[u8], kdf: &KdfParams) -> Result<Self, EnvelopeError> {
        let mut key = [0u8; 32];
        kdf.argon2()?
            .hash_password_into(secret.as_bytes(), salt, &mut key)
            .map_err(|_| EnvelopeError::InvalidKdfParams)?;
        Ok(Self(key))
    }

    fn cipher(&self) -> XChaCha20Poly1305 {
        XChaCha20Poly1305::new((&self.0).into())
    }
}

/// 暗号化エンベロープかどうか（先頭マジックのみで判定）
pub fn is_sealed(bytes: &[u8]) -> bool {
    bytes.starts_with(&MAGIC)
}

/// パース済みのエンベロープ
///
/// パースは鍵を必要としないため、パスフレーズを尋ねる前にヘッダの破損を検出できる。
#[derive(Debug)]
pub struct SealedBundle<'a> {
    header: &'a [u8],
    kdf: KdfParams,
    salt: &'a [u8],
    nonce: &'a [u8],
    ciphertext: &'a [u8],
}

impl<'a> SealedBundle<'a> {
    pub fn parse(bytes: &'a [u8]) -> Result<Self, EnvelopeError> {
        if bytes.len() < 4 || !is_sealed(bytes) {
            return Err(EnvelopeError::Truncated);
        }
        if bytes[3] != VERSION {
            return Err(EnvelopeError::UnsupportedVersion(bytes[3]));
        }
        if bytes.len() < HEADER_LEN {
            return Err(EnvelopeError::Truncated);
        }

        let read_u32 = |offset: usize| {
            u32::from_le_bytes([
                bytes[offset],
                bytes[offset + 1],
                bytes[offset + 2],
                bytes[offset + 3],
            ])
        };
        let kdf = KdfParams {
            m_cost: read_u32(4),
            t_cost: read_u32(8),
            p_cost: read_u32(12),
        };
        kdf.params()?;
        let salt_start = 16;
        let nonce_start = salt_start + SALT_LEN;

        Ok(Self {
            header: &bytes[..HEADER_LEN],
            kdf,
            salt: &bytes[salt_start..nonce_start],
            nonce: &bytes[nonce_start..HEADER_LEN],
            ciphertext: &bytes[HEADER_LEN..],
        })
    }

    pub fn kdf(&self) -> KdfParams {
        self.kdf
    }

    /// パスフレーズで復号
    pub fn open(&self, secret: &str) -> Result<Vec<u8>, EnvelopeError> {
        let key = BundleKey::derive(secret, self.salt, &self.kdf)?;
        let payload = Payload {
            msg: self.ciphertext,
            aad: self.header,
        };
        key.cipher()
            .decrypt(XNonce::from_slice(self.nonce), payload)
            .map_err(|_| EnvelopeError::Authentication)
    }
}

/// 既定の鍵導出パラメータで暗号化
pub fn seal(plaintext: &[u8], secret: &str) -> Result<Vec<u8>, EnvelopeError> {
    seal_with(plaintext, secret, KdfParams::default())
}

/// 鍵導出パラメータを指定して暗号化
pub fn seal_with(plaintext: &[u8], secret: &str, kdf: KdfParams) -> Result<Vec<u8>, EnvelopeError> {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    let key = BundleKey::derive(secret, &salt, &kdf)?;
    let nonce = XChaCha20Poly1305::generate_nonce(&mut OsRng);

    let mut out = Vec::with_capacity(HEADER_LEN + plaintext.len() + 16);
    out.extend_from_slice(&MAGIC);
    out.push(VERSION);
    out.extend_from_slice(&kdf.m_cost.to_le_bytes());
    out.extend_from_slice(&kdf.t_cost.to_le_bytes());
    out.extend_from_slice(&kdf.p_cost.to_le_bytes());
    out.extend_from_slice(&salt);
    out.extend_from_slice(&nonce);

    let payload = Payload {
        msg: plaintext,
        aad: &out[..HEADER_LEN],
    };
    let ciphertext = key
        .cipher()
        .encrypt(&nonce, payload)
        .map_err(|_| EnvelopeError::Encryption)?;
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

#[cfg(test)]
pub(crate) const TEST_KDF: KdfParams = KdfParams {
    m_cost: 8,
    t_cost: 1,
    p_cost: 1,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_with_correct_secret() {
        let sealed = seal_with(b"{\"Backup\":{}}", "correct horse", TEST_KDF).unwrap();
        assert!(is_sealed(&sealed));

        let parsed = SealedBundle::parse(&sealed).unwrap();
        assert_eq!(parsed.kdf(), TEST_KDF);
        assert_eq!(parsed.open("correct horse").unwrap(), b"{\"Backup\":{}}");
    }

    #[test]
    fn open_with_wrong_secret_fails_authentication() {
        let sealed = seal_with(b"payload", "correct horse", TEST_KDF).unwrap();
        let parsed = SealedBundle::parse(&sealed).unwrap();
        assert_eq!(parsed.open("battery staple"), Err(EnvelopeError::Authentication));
    }

    #[test]
    fn tampered_header_fails_authentication() {
        let mut sealed = seal_with(b"payload", "pw", TEST_KDF).unwrap();
        // salt の 1 バイトを改変
        sealed[20] ^= 0xff;
        let parsed = SealedBundle::parse(&sealed).unwrap();
        assert_eq!(parsed.open("pw"), Err(EnvelopeError::Authentication));
    }

    #[test]
    fn truncated_header_is_rejected() {
        let sealed = seal_with(b"payload", "pw", TEST_KDF).unwrap();
        assert_eq!(
            SealedBundle::parse(&sealed[..HEADER_LEN - 1]).unwrap_err(),
            EnvelopeError::Truncated
        );
        assert_eq!(SealedBundle::parse(b"JB").unwrap_err(), EnvelopeError::Truncated);
    }

    #[test]
    fn unknown_version_is_rejected() {
        let mut sealed = seal_with(b"payload", "pw", TEST_KDF).unwrap();
        sealed[3] = 9;
        assert_eq!(
            SealedBundle::parse(&sealed).unwrap_err(),
            EnvelopeError::UnsupportedVersion(9)
        );
    }

    #[test]
    fn oversized_kdf_params_are_rejected_at_parse() {
        let mut sealed = seal_with(b"payload", "pw", TEST_KDF).unwrap();
        sealed[4..8].copy_from_slice(&u32::MAX.to_le_bytes());
        assert_eq!(
            SealedBundle::parse(&sealed).unwrap_err(),
            EnvelopeError::InvalidKdfParams
        );

        let mut sealed = seal_with(b"payload", "pw", TEST_KDF).unwrap();
        sealed[8..12].copy_from_slice(&(MAX_T_COST + 1).to_le_bytes());
        assert_eq!(
            SealedBundle::parse(&sealed).unwrap_err(),
            EnvelopeError::InvalidKdfParams
        );
    }

    #[test]
    fn zero_parallelism_is_rejected_at_parse() {
        let mut sealed = seal_with(b"payload", "pw", TEST_KDF).unwrap();
        sealed[12..16].copy_from_slice(&0u32.to_le_bytes());
        assert_eq!(
            SealedBundle::parse(&sealed).unwrap_err(),
            EnvelopeError::InvalidKdfParams
        );
    }

    #[test]
    fn plain_json_is_not_sealed() {
        assert!(!is_sealed(b"{\"Backup\":{}}"));
    }
}
