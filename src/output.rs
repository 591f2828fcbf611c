//! Consistent, colored user-facing messages.
//! Colors are enabled only when the target stream is a TTY.

use owo_colors::OwoColorize;

fn is_tty(stream: atty::Stream) -> bool {
    atty::is(stream)
}

pub fn print_info(msg: &str) {
    if is_tty(atty::Stream::Stdout) {
        println!("{} {}", "info:".cyan().bold(), msg);
    } else {
        println!("info: {}", msg);
    }
}

pub fn print_warn(msg: &str) {
    if is_tty(atty::Stream::Stderr) {
        eprintln!("{} {}", "warn:".yellow().bold(), msg);
    } else {
        eprintln!("warn: {}", msg);
    }
}

pub fn print_error(msg: &str) {
    if is_tty(atty::Stream::Stderr) {
        eprintln!("{} {}", "error:".red().bold(), msg);
    } else {
        eprintln!("error: {}", msg);
    }
}

pub fn print_success(msg: &str) {
    if is_tty(atty::Stream::Stdout) {
        println!("{} {}", "ok:".green().bold(), msg);
    } else {
        println!("ok: {}", msg);
    }
}

/// The uniform report for a negative facade result. The cause is not known
/// at this level, only that nothing happened.
pub fn print_not_done(op: &str, target: &str) {
    print_error(&format!("{op} '{target}': operation did not happen"));
}

/// Print a plain user-facing line (no prefix). Use this for primary outputs
/// such as paths and listings which users may script against.
pub fn print_user(msg: &str) {
    println!("{}", msg);
}
