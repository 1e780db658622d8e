//! Platform anchor provider interface

use enklu_core::AsyncToken;

/// Platform service that serializes and restores world anchors
///
/// Both calls return immediately; the provider completes the token from
/// whatever thread the platform reports on.
pub trait AnchorProvider: Send + Sync {
    /// Serialize the anchor's current pose to bytes
    fn export(&self, anchor_id: &str) -> AsyncToken<Vec<u8>>;

    /// Restore an anchor from previously exported bytes
    fn import(&self, anchor_id: &str, bytes: Vec<u8>) -> AsyncToken<()>;
}
