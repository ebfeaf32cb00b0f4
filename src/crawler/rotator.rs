use crate::config::Credential;
use crate::TrawlError;

/// Hands out credentials round-robin from a fixed pool
#[derive(Debug)]
pub struct CredentialRotator {
    pool: Vec<Credential>,
    cursor: usize,
}

impl CredentialRotator {
    /// Creates a rotator; an empty pool cannot make requests and is rejected
    pub fn new(pool: Vec<Credential>) -> Result<Self, TrawlError> {
        if pool.is_empty() {
            return Err(TrawlError::EmptyCredentialPool);
        }
        Ok(Self { pool, cursor: 0 })
    }

    /// Returns the next credential, wrapping around forever
    pub fn next(&mut self) -> &Credential {
        let credential = &self.pool[self.cursor];
        self.cursor = (self.cursor + 1) % self.pool.len();
        credential
    }
}
