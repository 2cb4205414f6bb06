//! Conversion settings

/// What to do with the per-table checksums stored in the WOFF table directory.
///
/// Whatever the policy, the checksum written to the OpenType table directory is
/// the one from the WOFF.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChecksumPolicy {
    /// Copy checksums through without looking at them.
    #[default]
    Trust,
    /// Log a warning for every table whose data does not match its checksum.
    Warn,
    /// Fail the conversion on the first mismatch.
    Reject,
}

/// Settings for a [`Converter`](crate::Converter).
///
/// The defaults accept anything that decodes: the signature is not checked and
/// checksums are trusted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Options {
    pub verify_signature: bool,
    pub checksums: ChecksumPolicy,
}

impl Options {
    /// Reject files whose signature is not `wOFF`
    pub fn verify_signature(mut self, verify: bool) -> Self {
        self.verify_signature = verify;
        self
    }

    pub fn checksums(mut self, policy: ChecksumPolicy) -> Self {
        self.checksums = policy;
        self
    }
}
