#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: &str| {
    let (program, _errors) = monkey::parse(input);
    let _ = program.to_string();
});
