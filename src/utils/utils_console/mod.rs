use std::sync::atomic::{AtomicBool, Ordering};
use colored::Colorize;

static VERBOSE_CONSOLE_OUTPUT: AtomicBool = AtomicBool::new(true);

/// Turns informational console output on or off.  Red (error) and Yellow (warning) prints are
/// always emitted regardless of this setting.
pub fn set_console_verbosity(verbose: bool) {
    VERBOSE_CONSOLE_OUTPUT.store(verbose, Ordering::Relaxed);
}

pub fn console_verbosity() -> bool {
    VERBOSE_CONSOLE_OUTPUT.load(Ordering::Relaxed)
}

/// Prints the given string with the given color.
///
/// ## Example
/// ```
/// use optima_locomotion::utils::utils_console::{optima_print, PrintMode, PrintColor};
/// optima_print("test", PrintMode::Print, PrintColor::Blue, false);
/// ```
pub fn optima_print(s: &str, mode: PrintMode, color: PrintColor, bolded: bool) {
    if !color.always_printed() && !console_verbosity() { return; }

    let mut string = match color {
        PrintColor::None => { s.normal() }
        _ => {
            let c = color.get_color_triple();
            s.truecolor(c.0, c.1, c.2)
        }
    };
    if bolded { string = string.bold(); }

    match mode {
        PrintMode::Println => { println!("{}", string); }
        PrintMode::Print => { print!("{}", string); }
    }
}

/// Enum that is used in optima_print function.
/// Println will cause a new line after each line, while Print will not.
#[derive(Clone, Debug)]
pub enum PrintMode {
    Println,
    Print
}

/// Defines color for an optima print command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PrintColor {
    None,
    Blue,
    Green,
    Red,
    Yellow
}
impl PrintColor {
    pub fn get_color_triple(&self) -> (u8, u8, u8) {
        match self {
            PrintColor::None => { (0,0,0) }
            PrintColor::Blue => { return (0, 0, 255) }
            PrintColor::Green => { return (0, 255, 0) }
            PrintColor::Red => { return (255, 0, 0) }
            PrintColor::Yellow => { return (255, 255, 0) }
        }
    }
    fn always_printed(&self) -> bool {
        match self {
            PrintColor::Red | PrintColor::Yellow => { true }
            _ => { false }
        }
    }
}
