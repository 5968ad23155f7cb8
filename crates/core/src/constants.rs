/// Currency assigned to holdings recorded without one
pub const DEFAULT_CURRENCY: &str = "CAD";
