/// Minimum number of captured lines before a blank line ends the excerpt.
/// Python tracebacks open with the marker line plus at least one frame, so a
/// stray blank directly under the marker must not cut the capture short.
const MIN_CAPTURED_LINES: usize = 3;

const TRACEBACK_MARKER: &str = "Traceback (most recent call last)";

/// Reduce a raw renderer error dump to the traceback excerpt worth feeding
/// back into a repair prompt.
///
/// Capture starts at the line containing the traceback marker (inclusive) and
/// ends at the first blank line once at least three lines were captured. If
/// the marker never appears the input is returned unchanged; if the dump ends
/// mid-traceback, everything captured so far is returned.
pub fn classify_error(raw_error: &str) -> String {
    let mut captured: Vec<&str> = Vec::new();
    let mut capturing = false;

    for line in raw_error.lines() {
        if !capturing {
            if line.contains(TRACEBACK_MARKER) {
                capturing = true;
                captured.push(line);
            }
        } else {
            if line.trim().is_empty() && captured.len() >= MIN_CAPTURED_LINES {
                break;
            }
            captured.push(line);
        }
    }

    if captured.is_empty() {
        raw_error.to_string()
    } else {
        captured.join("\n")
    }
}
