//! Blank line removal for rendered output.
//!
//! Template control blocks leave whitespace-only lines behind. They carry no
//! meaning for HAProxy and make diffs between renders noisy.

/// Append every line of `input` that has a non-whitespace byte to `output`.
///
/// Line terminators are kept as they are, so input without blank lines is
/// copied unchanged.
pub fn strip_blank_lines(input: &[u8], output: &mut Vec<u8>) {
    for line in input.split_inclusive(|b| *b == b'\n') {
        if !line.iter().all(u8::is_ascii_whitespace) {
            output.extend_from_slice(line);
        }
    }
}
