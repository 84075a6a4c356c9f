/// Native currency base units per whole unit (payments and plaintext balances are in base units).
pub const NATIVE_UNIT: u64 = 1_000_000_000;

/// Divisor applied to a native payment before it is lifted into a 32-bit ciphertext.
pub const DEFAULT_PAYMENT_DIVISOR: u64 = 1_000_000;

/// Window (seconds) after the last operation during which an account is considered active.
pub const DEFAULT_ACTIVITY_WINDOW_SECS: u64 = 300;

/// Basis-point denominator for multipliers (1.0x = 10_000).
pub const BASIS_POINTS: u64 = 10_000;

/// Plaintext path winnings multiplier (1.5x).
pub const DEFAULT_PLAIN_MULTIPLIER_BPS: u64 = 15_000;

/// Confidential path winnings multiplier (2x), applied as a ciphertext product.
pub const DEFAULT_CONFIDENTIAL_MULTIPLIER: u32 = 2;

/// Lowest and highest card rank a draw can produce.
pub const MIN_CARD: u8 = 1;
pub const MAX_CARD: u8 = 13;

/// Ranks in the draw space.
pub const CARD_RANKS: u8 = 13;

/// Maximum length of an externally supplied ciphertext payload.
pub const MAX_CIPHERTEXT_LENGTH: usize = 1024;

/// Maximum length of an input proof blob.
pub const MAX_PROOF_LENGTH: usize = 4096;

/// Maximum length of a rejection message carried in an event.
pub const MAX_MESSAGE_LENGTH: usize = 256;

/// Error codes for `Event::Rejected`.
pub const ERROR_ZERO_VALUE_DEPOSIT: u8 = 1;
pub const ERROR_SELF_TRANSFER: u8 = 2;
pub const ERROR_NO_DEPOSIT: u8 = 3;
pub const ERROR_INSUFFICIENT_BALANCE: u8 = 4;
pub const ERROR_PROOF_VERIFICATION_FAILED: u8 = 5;
pub const ERROR_GAME_ALREADY_ACTIVE: u8 = 6;
pub const ERROR_NO_ACTIVE_GAME: u8 = 7;
pub const ERROR_ZERO_WAGER: u8 = 8;
pub const ERROR_DEPOSIT_OUT_OF_RANGE: u8 = 9;
/// Ciphertext operands had the wrong type for the requested operation.
pub const ERROR_CIPHER_TYPE: u8 = 10;
/// Amount representation did not match the ledger it was submitted to.
pub const ERROR_WRONG_LEDGER: u8 = 11;
pub const ERROR_ARITHMETIC_OVERFLOW: u8 = 12;
