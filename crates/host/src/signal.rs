//! Signal name/number resolution (spec.md §4.3 "Signal delivery").

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SignalError {
    #[error("unknown signal name: {0}")]
    UnknownName(String),
    #[error("signal number out of range (expected 1..=64): {0}")]
    OutOfRange(i64),
}

/// Resolve a signal given as a decimal number or a name (case-insensitive,
/// optional `SIG` prefix) to its platform integer value.
pub fn resolve(input: &str) -> Result<i32, SignalError> {
    let trimmed = input.trim();
    if let Ok(n) = trimmed.parse::<i64>() {
        if (1..=64).contains(&n) {
            return Ok(n as i32);
        }
        return Err(SignalError::OutOfRange(n));
    }
    let upper = trimmed.to_ascii_uppercase();
    let name = upper.strip_prefix("SIG").unwrap_or(&upper);
    by_name(name).ok_or_else(|| SignalError::UnknownName(input.to_string()))
}

fn by_name(name: &str) -> Option<i32> {
    let sig = match name {
        "HUP" => libc::SIGHUP,
        "INT" => libc::SIGINT,
        "QUIT" => libc::SIGQUIT,
        "ILL" => libc::SIGILL,
        "TRAP" => libc::SIGTRAP,
        "ABRT" | "IOT" => libc::SIGABRT,
        "BUS" => libc::SIGBUS,
        "FPE" => libc::SIGFPE,
        "KILL" => libc::SIGKILL,
        "USR1" => libc::SIGUSR1,
        "SEGV" => libc::SIGSEGV,
        "USR2" => libc::SIGUSR2,
        "PIPE" => libc::SIGPIPE,
        "ALRM" => libc::SIGALRM,
        "TERM" => libc::SIGTERM,
        "STKFLT" => libc::SIGSTKFLT,
        "CHLD" | "CLD" => libc::SIGCHLD,
        "CONT" => libc::SIGCONT,
        "STOP" => libc::SIGSTOP,
        "TSTP" => libc::SIGTSTP,
        "TTIN" => libc::SIGTTIN,
        "TTOU" => libc::SIGTTOU,
        "URG" => libc::SIGURG,
        "XCPU" => libc::SIGXCPU,
        "XFSZ" => libc::SIGXFSZ,
        "VTALRM" => libc::SIGVTALRM,
        "PROF" => libc::SIGPROF,
        "WINCH" => libc::SIGWINCH,
        "IO" | "POLL" => libc::SIGIO,
        "PWR" => libc::SIGPWR,
        "SYS" | "UNUSED" => libc::SIGSYS,
        _ => return None,
    };
    Some(sig)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_name_with_and_without_prefix() {
        assert_eq!(resolve("TERM").unwrap(), libc::SIGTERM);
        assert_eq!(resolve("SIGTERM").unwrap(), libc::SIGTERM);
        assert_eq!(resolve("term").unwrap(), libc::SIGTERM);
        assert_eq!(resolve("sigterm").unwrap(), libc::SIGTERM);
    }

    #[test]
    fn resolves_number_in_range() {
        assert_eq!(resolve("9").unwrap(), 9);
        assert_eq!(resolve("64").unwrap(), 64);
    }

    #[test]
    fn rejects_out_of_range_number() {
        assert!(matches!(resolve("0"), Err(SignalError::OutOfRange(0))));
        assert!(matches!(resolve("65"), Err(SignalError::OutOfRange(65))));
    }

    #[test]
    fn rejects_unknown_name() {
        assert!(matches!(resolve("NOTASIGNAL"), Err(SignalError::UnknownName(_))));
    }
}
