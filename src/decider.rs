// Decision-function capability
//
// The function under test is opaque to the arena: it receives the flattened
// snake (8 ints), foods (2 ints per item) and barriers (2 ints per slot, -1
// sentinels) and answers a direction code, or -1 for "no path".

use log::{debug, error, info, warn};
use serde::Serialize;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

/// Anything that can pick a direction for a single-snake scenario
pub trait DecisionFunction {
    /// Display name used in logs and reports
    fn name(&self) -> &str;

    /// Returns a direction code; `Err` is a fault of the implementation itself
    fn decide(&mut self, snake: &[i32], foods: &[i32], barriers: &[i32]) -> Result<i32, String>;
}

impl<D: DecisionFunction + ?Sized> DecisionFunction for Box<D> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn decide(&mut self, snake: &[i32], foods: &[i32], barriers: &[i32]) -> Result<i32, String> {
        (**self).decide(snake, foods, barriers)
    }
}

/// Adapts a closure into a decision function
pub struct FnDecider<F> {
    name: String,
    func: F,
}

impl<F> FnDecider<F>
where
    F: FnMut(&[i32], &[i32], &[i32]) -> Result<i32, String>,
{
    pub fn new(name: impl Into<String>, func: F) -> Self {
        FnDecider {
            name: name.into(),
            func,
        }
    }
}

impl<F> DecisionFunction for FnDecider<F>
where
    F: FnMut(&[i32], &[i32], &[i32]) -> Result<i32, String>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn decide(&mut self, snake: &[i32], foods: &[i32], barriers: &[i32]) -> Result<i32, String> {
        (self.func)(snake, foods, barriers)
    }
}

/// One request line sent to an external decision process
#[derive(Debug, Serialize)]
struct DecisionRequest<'a> {
    snake: &'a [i32],
    foods: &'a [i32],
    barriers: &'a [i32],
}

/// Pipes to a running decision process
struct ChildIo {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

impl ChildIo {
    fn start(program: &str, args: &[String]) -> Result<Self, String> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| format!("Failed to start decision process '{}': {}", program, e))?;

        let stdin = child
            .stdin
            .take()
            .ok_or("Decision process has no stdin handle")?;
        let stdout = child
            .stdout
            .take()
            .ok_or("Decision process has no stdout handle")?;

        info!("Started decision process '{}' (pid {})", program, child.id());

        Ok(ChildIo {
            child,
            stdin,
            stdout: BufReader::new(stdout),
        })
    }

    /// Sends one request line and reads one reply line
    fn exchange(&mut self, line: &str) -> Result<String, String> {
        writeln!(self.stdin, "{}", line)
            .and_then(|_| self.stdin.flush())
            .map_err(|e| format!("Failed to write to decision process: {}", e))?;

        let mut reply = String::new();
        let read = self
            .stdout
            .read_line(&mut reply)
            .map_err(|e| format!("Failed to read from decision process: {}", e))?;
        if read == 0 {
            return Err("Decision process closed its output".to_string());
        }
        Ok(reply)
    }

    fn stop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Runs the decision function in a child process.
///
/// Protocol: one JSON object per line on stdin, one integer per line on
/// stdout. The process is kept alive across calls. A call that fails on the
/// pipes returns `Err` and the process is restarted before the next call.
pub struct ProcessDecider {
    name: String,
    program: String,
    args: Vec<String>,
    io: ChildIo,
}

impl ProcessDecider {
    /// Spawns `program` with `args`
    pub fn spawn(program: &str, args: &[String]) -> Result<Self, String> {
        Ok(ProcessDecider {
            name: program.to_string(),
            program: program.to_string(),
            args: args.to_vec(),
            io: ChildIo::start(program, args)?,
        })
    }

    /// Splits a command line on whitespace and spawns it.
    ///
    /// Quoting is not interpreted; wrap the command in a script when an
    /// argument contains spaces.
    pub fn from_command_line(command: &str) -> Result<Self, String> {
        let mut parts = command.split_whitespace();
        let program = parts
            .next()
            .ok_or_else(|| "Empty decision command".to_string())?;
        let args: Vec<String> = parts.map(str::to_string).collect();
        Self::spawn(program, &args)
    }

    /// Replaces a crashed child with a fresh one
    fn restart(&mut self) -> Result<(), String> {
        self.io.stop();
        self.io = ChildIo::start(&self.program, &self.args)?;
        Ok(())
    }
}

impl DecisionFunction for ProcessDecider {
    fn name(&self) -> &str {
        &self.name
    }

    fn decide(&mut self, snake: &[i32], foods: &[i32], barriers: &[i32]) -> Result<i32, String> {
        let request = DecisionRequest {
            snake,
            foods,
            barriers,
        };
        let line = serde_json::to_string(&request)
            .map_err(|e| format!("Failed to serialize decision request: {}", e))?;

        let reply = match self.io.exchange(&line) {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Decision process '{}' failed, restarting: {}", self.program, e);
                if let Err(restart) = self.restart() {
                    error!("{}", restart);
                }
                return Err(e);
            }
        };

        debug!("{} -> {}", line, reply.trim());
        parse_reply(&reply)
    }
}

impl Drop for ProcessDecider {
    fn drop(&mut self) {
        self.io.stop();
    }
}

/// Parses a single integer reply line
fn parse_reply(reply: &str) -> Result<i32, String> {
    reply
        .trim()
        .parse::<i32>()
        .map_err(|e| format!("Invalid decision reply '{}': {}", reply.trim(), e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fn_decider_forwards_arguments() {
        let mut seen = Vec::new();
        {
            let record = |snake: &[i32], foods: &[i32], barriers: &[i32]| {
                seen.push((snake.len(), foods.len(), barriers.len()));
                Ok(2)
            };
            let mut decider = FnDecider::new("recorder", record);
            assert_eq!(decider.name(), "recorder");
            assert_eq!(decider.decide(&[0; 8], &[1, 1], &[-1; 24]), Ok(2));
        }
        assert_eq!(seen, vec![(8, 2, 24)]);
    }

    #[test]
    fn test_boxed_decider_is_a_decider() {
        let mut boxed: Box<dyn DecisionFunction> =
            Box::new(FnDecider::new("boxed", |_: &[i32], _: &[i32], _: &[i32]| Ok(-1)));
        assert_eq!(boxed.name(), "boxed");
        assert_eq!(boxed.decide(&[], &[], &[]), Ok(-1));
    }

    #[test]
    fn test_parse_reply() {
        assert_eq!(parse_reply("3\n"), Ok(3));
        assert_eq!(parse_reply("  -1 "), Ok(-1));
        assert!(parse_reply("up").is_err());
        assert!(parse_reply("").is_err());
    }

    #[test]
    fn test_request_serialization() {
        let request = DecisionRequest {
            snake: &[1, 2],
            foods: &[3, 4],
            barriers: &[-1, -1],
        };
        assert_eq!(
            serde_json::to_string(&request).unwrap(),
            r#"{"snake":[1,2],"foods":[3,4],"barriers":[-1,-1]}"#
        );
    }

    #[test]
    fn test_empty_command_is_rejected() {
        assert!(ProcessDecider::from_command_line("   ").is_err());
    }

    #[test]
    fn test_missing_program_is_rejected() {
        assert!(ProcessDecider::spawn("/nonexistent/decider-binary", &[]).is_err());
    }

    /// Spawns `sh -c script`
    #[cfg(unix)]
    fn shell(script: &str) -> ProcessDecider {
        ProcessDecider::spawn("sh", &["-c".to_string(), script.to_string()]).unwrap()
    }

    #[cfg(unix)]
    #[test]
    fn test_process_receives_json_and_answers() {
        // Answers up for a snake headed at (4,4), no path for anything else
        let mut decider = shell(
            r#"while read line; do
                 case "$line" in
                   '{"snake":[4,4,'*'"barriers":[-1,-1]}') echo 0 ;;
                   '{"snake":'*) echo -1 ;;
                   *) echo garbage ;;
                 esac
               done"#,
        );
        assert_eq!(decider.name(), "sh");
        assert_eq!(decider.decide(&[4, 4, 4, 3, 4, 2, 4, 1], &[4, 5], &[-1, -1]), Ok(0));
        assert_eq!(decider.decide(&[1, 4, 1, 3, 1, 2, 1, 1], &[1, 7], &[2, 7]), Ok(-1));
    }

    #[cfg(unix)]
    #[test]
    fn test_unparsable_reply_is_an_error() {
        let mut decider = shell("while read line; do echo left; done");
        let err = decider.decide(&[4, 4, 4, 3, 4, 2, 4, 1], &[4, 5], &[]).unwrap_err();
        assert!(err.contains("Invalid decision reply 'left'"), "got: {}", err);
    }

    #[cfg(unix)]
    #[test]
    fn test_closed_output_is_an_error() {
        let mut decider = shell("read line; exit 0");
        let err = decider.decide(&[4, 4, 4, 3, 4, 2, 4, 1], &[4, 5], &[]).unwrap_err();
        assert!(err.contains("closed its output"), "got: {}", err);
        // Restarted, so the next call faults the same way instead of a broken pipe
        let err = decider.decide(&[4, 4, 4, 3, 4, 2, 4, 1], &[4, 5], &[]).unwrap_err();
        assert!(err.contains("closed its output"), "got: {}", err);
    }

    #[cfg(unix)]
    #[test]
    fn test_command_line_arguments_are_split_on_whitespace() {
        let mut decider = ProcessDecider::from_command_line("awk {print(2);fflush()}").unwrap();
        assert_eq!(decider.name(), "awk");
        assert_eq!(decider.decide(&[4, 4, 4, 3, 4, 2, 4, 1], &[4, 5], &[]), Ok(2));
    }
}
