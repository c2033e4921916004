pub const CMD_QUIT: &[&str] = &["quit", "exit"];
pub const CMD_HELP: &[&str] = &["help", "?"];
pub const CMD_BACK: &[&str] = &["back", "b"];
pub const CMD_CONTINUE: &[&str] = &["continue", "c"];
pub const CMD_PROCEED: &[&str] = &["proceed", "go"];

pub const BAR_WIDTH: usize = 24;
pub const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";
