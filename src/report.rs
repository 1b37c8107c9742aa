//! Status lines. `[run]` marks progress on stdout, `[err]` marks
//! diagnostics on stderr, so a calling process can split the two without
//! looking at exit codes.

use crate::error::RunError;

pub fn step(index: usize, total: usize, action: &str) {
    println!("[run] step {index}/{total}: {action}");
}

pub fn success(total: usize) {
    println!("[run] ✅ completed {total} step(s)");
}

pub fn failure(err: &RunError) {
    eprintln!("[err] ❌ {err}");
}
