//! Locates the nestest fixtures. The ROM and its reference log are not
//! vendored with the repository; drop `nestest.nes` and the CYC-dot-format
//! `nestest.log` into `tests/data/` to enable the full comparison run.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

pub const NESTEST_ROM_PATH: &str = "./tests/data/nestest.nes";
pub const NESTEST_GOLD_LOG_PATH: &str = "./tests/data/nestest.log";

pub fn fixtures_present() -> bool {
    Path::new(NESTEST_ROM_PATH).exists() && Path::new(NESTEST_GOLD_LOG_PATH).exists()
}

pub fn load_gold_standard_log() -> impl Iterator<Item = String> {
    let file = File::open(NESTEST_GOLD_LOG_PATH).expect("failed to read nestest gold log");
    BufReader::new(file)
        .lines()
        .map(|line| line.expect("failed to read gold log line"))
        .filter(|line| !line.trim().is_empty())
}
