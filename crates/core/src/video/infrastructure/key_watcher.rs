use std::io::BufRead;

use crossbeam_channel::Receiver;

/// Watches standard input for keys on a background thread.
///
/// Terminals deliver input line by line, so a key counts once Enter is
/// pressed. The first character of every non-blank line is forwarded.
pub fn spawn() -> Receiver<char> {
    spawn_from(std::io::BufReader::new(std::io::stdin()))
}

/// Same as [`spawn`], reading from any line-oriented source.
///
/// The thread exits at end of input or once the receiver is dropped.
pub fn spawn_from<R: BufRead + Send + 'static>(input: R) -> Receiver<char> {
    let (tx, rx) = crossbeam_channel::unbounded();

    std::thread::spawn(move || {
        for line in input.lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    log::debug!("Key watcher stopped: {e}");
                    break;
                }
            };
            let Some(key) = line.trim().chars().next() else {
                continue;
            };
            if tx.send(key).is_err() {
                break;
            }
        }
    });

    rx
}
