pub const SERVER_IP_ADDRESS: &str = "127.0.0.1";
pub const BASE_PORT: u16 = 8080;
pub const TIMEOUT_SECONDS: u64 = 2;

// One-time codes
pub const OTP_LENGTH: usize = 6;
pub const OTP_TTL_SECONDS: u64 = 15 * 60;
pub const OTP_MAX_ATTEMPTS: u32 = 3;

// Franjas sembradas al arrancar el servidor
pub const SEEDED_CENTERS: [&str; 2] = ["center-north", "center-south"];
pub const TIMESLOTS_PER_CENTER: u32 = 4;
pub const TIMESLOT_CAPACITY: u32 = 10;
pub const TIMESLOT_SPACING_HOURS: i64 = 2;
