use std::fmt;

use hmac::{Hmac, Mac};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use sha2::{Digest, Sha256};

// Deterministic RNG using provably-fair HMAC construction
// server_seed (secret) + client_seed + nonce -> HMAC-SHA256 -> byte stream
// The stream continues with SHA-256 of the previous 32-byte block.

pub type HmacSha256 = Hmac<Sha256>;

pub fn derive_hash_hex(input: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input);
    hex::encode(hasher.finalize())
}

/// Seeded general-purpose generator for reproducible spins and simulations.
pub fn seeded_rng(seed: u64) -> ChaCha20Rng {
    ChaCha20Rng::seed_from_u64(seed)
}

#[derive(Clone)]
pub struct ProvablyFairRng {
    server_seed: String, // secret until revealed
    client_seed: String,
    nonce: u64,
    block: [u8; 32],
    cursor: usize,
}

impl ProvablyFairRng {
    pub fn new(server_seed: impl Into<String>, client_seed: impl Into<String>, nonce: u64) -> Self {
        let server_seed = server_seed.into();
        let client_seed = client_seed.into();
        let block = hmac_bytes(&server_seed, &client_seed, nonce);
        Self {
            server_seed,
            client_seed,
            nonce,
            block,
            cursor: 0,
        }
    }

    pub fn server_seed_hash_hex(&self) -> String {
        derive_hash_hex(self.server_seed.as_bytes())
    }

    pub fn client_seed(&self) -> &str {
        &self.client_seed
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    /// First block of the stream.
    pub fn hmac_bytes(&self) -> [u8; 32] {
        hmac_bytes(&self.server_seed, &self.client_seed, self.nonce)
    }

    fn next_byte(&mut self) -> u8 {
        if self.cursor == self.block.len() {
            let next = Sha256::digest(self.block);
            self.block.copy_from_slice(&next);
            self.cursor = 0;
        }
        let b = self.block[self.cursor];
        self.cursor += 1;
        b
    }
}

// The server seed stays secret until revealed; only its commitment is shown.
impl fmt::Debug for ProvablyFairRng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProvablyFairRng")
            .field("server_seed_hash", &self.server_seed_hash_hex())
            .field("client_seed", &self.client_seed)
            .field("nonce", &self.nonce)
            .finish_non_exhaustive()
    }
}

fn hmac_bytes(server_seed: &str, client_seed: &str, nonce: u64) -> [u8; 32] {
    let mut mac =
        HmacSha256::new_from_slice(server_seed.as_bytes()).expect("HMAC accepts any key length");
    let msg = format!("{}:{}", client_seed, nonce);
    mac.update(msg.as_bytes());
    let res = mac.finalize().into_bytes();
    let mut out = [0u8; 32];
    out.copy_from_slice(&res);
    out
}

impl RngCore for ProvablyFairRng {
    fn next_u32(&mut self) -> u32 {
        let mut buf = [0u8; 4];
        self.fill_bytes(&mut buf);
        u32::from_be_bytes(buf)
    }

    fn next_u64(&mut self) -> u64 {
        let mut buf = [0u8; 8];
        self.fill_bytes(&mut buf);
        u64::from_be_bytes(buf)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for b in dest.iter_mut() {
            *b = self.next_byte();
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}
