/// PBKDF2 salt length in bytes, prepended to every envelope.
pub const KDF_SALT_LENGTH: usize = 16;

/// AES-GCM IV length in bytes (96 bits per NIST recommendation).
pub const AES_GCM_IV_LENGTH: usize = 12;

/// AES-GCM tag length in bytes (128 bits).
pub const AES_GCM_TAG_LENGTH: usize = 16;

/// AES key length in bytes (256 bits).
pub const AES_KEY_LENGTH: usize = 32;

/// PBKDF2-HMAC-SHA256 iteration count.
pub const PBKDF2_ITERATIONS: u32 = 10_000;

/// Smallest well-formed envelope: salt + IV + tag (empty plaintext).
///
/// Envelope wire format: [salt:16][IV:12][ciphertext + tag]
pub const MIN_ENVELOPE_LENGTH: usize = KDF_SALT_LENGTH + AES_GCM_IV_LENGTH + AES_GCM_TAG_LENGTH;
