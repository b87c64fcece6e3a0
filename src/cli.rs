//! Command-line argument parsing for the `sechan` binary.
//!
//! Usage:
//!   sechan -p <local-port> -P <remote-port> [-R <remote-ipv4>] [-C <profile>] [-v]

use std::process::ExitCode;

pub struct Args {
    pub local_port: u16,
    pub remote_port: u16,
    pub remote_host: String,
    pub profile_path: String,
    pub verbose: bool,
}

impl Args {
    const DEFAULT_REMOTE_HOST: &'static str = "127.0.0.1";
    const DEFAULT_PROFILE_PATH: &'static str = "sechan.cfg";

    /// Parses `std::env::args()`. On `-h` prints usage and requests
    /// exit 0; on any parse error prints usage and requests a
    /// non-zero exit. The caller is responsible for actually exiting
    /// with the returned code rather than continuing.
    pub fn parse() -> Result<Self, ExitCode> {
        let raw: Vec<String> = std::env::args().collect();
        Self::parse_from(&raw[1..])
    }

    fn parse_from(args: &[String]) -> Result<Self, ExitCode> {
        let mut local_port: Option<u16> = None;
        let mut remote_port: Option<u16> = None;
        let mut remote_host = Self::DEFAULT_REMOTE_HOST.to_string();
        let mut profile_path = Self::DEFAULT_PROFILE_PATH.to_string();
        let mut verbose = false;

        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "-h" => {
                    print_usage();
                    return Err(ExitCode::SUCCESS);
                }
                "-v" => verbose = true,
                "-p" => {
                    i += 1;
                    local_port = Some(parse_port(args.get(i))?);
                }
                "-P" => {
                    i += 1;
                    remote_port = Some(parse_port(args.get(i))?);
                }
                "-R" => {
                    i += 1;
                    remote_host = args.get(i).ok_or_else(invalid)?.clone();
                }
                "-C" => {
                    i += 1;
                    profile_path = args.get(i).ok_or_else(invalid)?.clone();
                }
                other => {
                    eprintln!("unrecognized option: {}", other);
                    return Err(invalid());
                }
            }
            i += 1;
        }

        let local_port = local_port.ok_or_else(|| {
            eprintln!("missing required option: -p <port>");
            invalid()
        })?;
        let remote_port = remote_port.ok_or_else(|| {
            eprintln!("missing required option: -P <port>");
            invalid()
        })?;

        Ok(Self {
            local_port,
            remote_port,
            remote_host,
            profile_path,
            verbose,
        })
    }
}

fn parse_port(raw: Option<&String>) -> Result<u16, ExitCode> {
    raw.ok_or_else(invalid)?.parse::<u16>().map_err(|_| invalid())
}

fn invalid() -> ExitCode {
    print_usage();
    ExitCode::FAILURE
}

fn print_usage() {
    eprintln!(
        "sechan — unidirectional secure datagram channel\n\
\n\
USAGE:\n\
    sechan -p <local-port> -P <remote-port> [-R <remote-ipv4>] [-C <profile>] [-v]\n\
\n\
OPTIONS:\n\
    -p <port>    local UDP bind port (required)\n\
    -P <port>    remote UDP port (required)\n\
    -R <ipv4>    remote host (default 127.0.0.1)\n\
    -C <path>    profile path (default sechan.cfg)\n\
    -v           enable debug trace to stderr\n\
    -h           print this message and exit\n"
    );
}
