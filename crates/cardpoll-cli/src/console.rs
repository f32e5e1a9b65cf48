//! Line-based console for steering the simulated readers.
//!
//! Each line on stdin is one command:
//!
//! ```text
//! present <reader> <hex uid>   place a card in a reader field
//! remove <reader>              take the card away
//! fail <reader>                make the next serial read on a reader fail
//! quit                         stop polling and exit
//! ```

use cardpoll_core::constants::READER_COUNT;
use cardpoll_core::{CardUid, ReaderId};
use cardpoll_hardware::mock::MockCardReaderHandle;
use std::str::{FromStr, SplitWhitespace};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Present { reader: ReaderId, uid: CardUid },
    Remove { reader: ReaderId },
    Fail { reader: ReaderId },
    Quit,
}

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Unknown command: {0}")]
    Unknown(String),

    #[error("Missing {argument} for '{command}'")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },

    #[error("Unexpected argument: {0}")]
    Trailing(String),

    #[error(transparent)]
    Invalid(#[from] cardpoll_core::Error),
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let verb = words.next().unwrap_or_default();

        let command = match verb.to_ascii_lowercase().as_str() {
            "present" => {
                let reader = next_reader(&mut words, "present")?;
                // Everything after the reader is the UID, so "DE AD BE EF" works too.
                let hex: Vec<&str> = words.by_ref().collect();
                if hex.is_empty() {
                    return Err(CommandError::MissingArgument {
                        command: "present",
                        argument: "uid",
                    });
                }
                let uid = hex.concat().parse::<CardUid>()?;
                Command::Present { reader, uid }
            }
            "remove" => Command::Remove {
                reader: next_reader(&mut words, "remove")?,
            },
            "fail" => Command::Fail {
                reader: next_reader(&mut words, "fail")?,
            },
            "quit" | "exit" => Command::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };

        match words.next() {
            Some(extra) => Err(CommandError::Trailing(extra.to_string())),
            None => Ok(command),
        }
    }
}

fn next_reader(
    words: &mut SplitWhitespace<'_>,
    command: &'static str,
) -> Result<ReaderId, CommandError> {
    let word = words.next().ok_or(CommandError::MissingArgument {
        command,
        argument: "reader",
    })?;
    Ok(word.parse::<ReaderId>()?)
}

/// Applies commands to the reader handles.
pub struct Console {
    readers: [MockCardReaderHandle; READER_COUNT],
}

impl Console {
    pub fn new(readers: [MockCardReaderHandle; READER_COUNT]) -> Self {
        Self { readers }
    }

    /// Apply one command. Returns `false` once the user asked to quit.
    pub fn apply(&self, command: Command) -> bool {
        match command {
            Command::Present { reader, uid } => {
                match self.readers[reader.index()].present_card(uid.as_bytes().to_vec()) {
                    Ok(()) => info!(reader = %reader, uid = %uid, "Card presented"),
                    Err(e) => warn!(reader = %reader, error = %e, "Could not present card"),
                }
            }
            Command::Remove { reader } => {
                self.readers[reader.index()].remove_card();
                info!(reader = %reader, "Card removed");
            }
            Command::Fail { reader } => {
                self.readers[reader.index()].fail_next_reads(1);
                info!(reader = %reader, "Next read will fail");
            }
            Command::Quit => return false,
        }
        true
    }

    /// Apply input lines until `quit` or until the line source closes.
    ///
    /// `quit` fires the signal. A closed source only stops the console; the
    /// poller keeps running until interrupted.
    pub async fn run(self, mut lines: mpsc::Receiver<String>, quit: oneshot::Sender<()>) {
        while let Some(line) = lines.recv().await {
            if line.trim().is_empty() {
                continue;
            }

            match line.parse::<Command>() {
                Ok(command) => {
                    if !self.apply(command) {
                        let _ = quit.send(());
                        return;
                    }
                }
                Err(e) => warn!(input = %line.trim(), error = %e, "Ignoring console input"),
            }
        }
        debug!("Console input closed");
    }
}

/// Forward stdin lines from a dedicated thread.
///
/// A blocking read on the runtime would hold up shutdown, so stdin gets its
/// own thread which ends with the process.
pub fn spawn_stdin_reader(buffer: usize) -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(buffer);

    std::thread::spawn(move || {
        for line in std::io::stdin().lines() {
            let Ok(line) = line else { break };
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });

    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardpoll_hardware::mock::MockCardReader;
    use cardpoll_hardware::types::ReaderPins;
    use rstest::rstest;

    fn console() -> (Console, [MockCardReaderHandle; READER_COUNT]) {
        let (_, first) = MockCardReader::new(ReaderPins::reader1());
        let (_, second) = MockCardReader::new(ReaderPins::reader2());
        (Console::new([first.clone(), second.clone()]), [first, second])
    }

    #[test]
    fn test_parse_present() {
        let command: Command = "present 1 DEADBEEF".parse().unwrap();
        assert_eq!(
            command,
            Command::Present {
                reader: ReaderId::FIRST,
                uid: CardUid::new(vec![0xDE, 0xAD, 0xBE, 0xEF]).unwrap(),
            }
        );
    }

    #[test]
    fn test_parse_present_spaced_uid() {
        let command: Command = "PRESENT 2 04 a1 b2 c3".parse().unwrap();
        assert_eq!(
            command,
            Command::Present {
                reader: ReaderId::SECOND,
                uid: CardUid::new(vec![0x04, 0xA1, 0xB2, 0xC3]).unwrap(),
            }
        );
    }

    #[rstest]
    #[case("remove 2", Command::Remove { reader: ReaderId::SECOND })]
    #[case("fail 1", Command::Fail { reader: ReaderId::FIRST })]
    #[case("quit", Command::Quit)]
    #[case("  exit  ", Command::Quit)]
    fn test_parse_simple(#[case] line: &str, #[case] expected: Command) {
        assert_eq!(line.parse::<Command>().unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("launch 1")]
    #[case("present")]
    #[case("present 1")]
    #[case("present 3 DEADBEEF")]
    #[case("present 1 DEADBEE")]
    #[case("present 1 ZZ")]
    #[case("remove")]
    #[case("remove 0")]
    #[case("fail 1 now")]
    #[case("quit now")]
    fn test_parse_rejects(#[case] line: &str) {
        assert!(line.parse::<Command>().is_err(), "{line:?} should not parse");
    }

    #[test]
    fn test_apply_steers_readers() {
        let (console, [first, second]) = console();

        assert!(console.apply("present 2 CAFEBABE".parse().unwrap()));
        assert!(!first.is_card_presented());
        assert_eq!(second.current_card_uid(), Some(vec![0xCA, 0xFE, 0xBA, 0xBE]));

        assert!(console.apply(Command::Remove { reader: ReaderId::SECOND }));
        assert!(!second.is_card_presented());

        assert!(!console.apply(Command::Quit));
    }

    fn feed(lines: &[&str]) -> mpsc::Receiver<String> {
        let (tx, rx) = mpsc::channel(lines.len().max(1));
        for line in lines {
            tx.try_send(line.to_string()).unwrap();
        }
        rx
    }

    #[tokio::test]
    async fn test_run_until_quit() {
        let (console, [first, _]) = console();
        let (tx, rx) = oneshot::channel();
        let input = feed(&["present 1 DEADBEEF", "", "bogus", "quit", "present 1 00000000"]);

        console.run(input, tx).await;

        assert!(rx.await.is_ok());
        assert_eq!(first.current_card_uid(), Some(vec![0xDE, 0xAD, 0xBE, 0xEF]));
    }

    #[tokio::test]
    async fn test_run_end_of_input_does_not_quit() {
        let (console, [_, second]) = console();
        let (tx, rx) = oneshot::channel();
        let input = feed(&["present 2 0102030405060708"]);

        console.run(input, tx).await;

        assert!(rx.await.is_err());
        assert!(second.is_card_presented());
    }
}
