//! `sechan` — unidirectional secure datagram channel over UDP.
//!
//! Reads plaintext lines from stdin, sends each as a SECURED SDU to
//! the remote peer, and prints decrypted plaintext received from that
//! peer to stdout. Sender and receiver directions run concurrently in
//! one process, as the original tool does for testing both ends of a
//! flow against each other.

use std::io::{self, BufRead, Write};
use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::mpsc;
use std::time::Duration;

use sechan::channel::{ReceiverChannel, SenderChannel};
use sechan::cli::Args;
use sechan::profile::Profile;
use sechan::transport::{Transport, UdpTransport};

const POLL_INTERVAL: Duration = Duration::from_millis(200);
const MAX_DATAGRAM: usize = 2048;

fn main() -> ExitCode {
    let args = match Args::parse() {
        Ok(args) => args,
        Err(code) => return code,
    };

    let profile = match Profile::load_and_validate(&args.profile_path) {
        Ok(profile) => profile,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if args.verbose {
        eprintln!("loaded profile:\n{}", profile.describe());
    }

    let remote: SocketAddr = match format!("{}:{}", args.remote_host, args.remote_port).parse() {
        Ok(addr) => addr,
        Err(e) => {
            eprintln!("error: invalid remote address: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let transport = match UdpTransport::bind(args.local_port, POLL_INTERVAL) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let this_nonce = args.local_port.to_string();
    let that_nonce = args.remote_port.to_string();
    let mut sender = SenderChannel::new(&profile, this_nonce.as_bytes(), that_nonce.as_bytes());
    let mut receiver = ReceiverChannel::new(&profile, that_nonce.as_bytes(), this_nonce.as_bytes());

    let stdin_lines = spawn_stdin_reader();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut recv_buf = [0u8; MAX_DATAGRAM];

    loop {
        match stdin_lines.try_recv() {
            Ok(Some(line)) => {
                let wire = sender.send(line.as_bytes());
                if args.verbose {
                    eprintln!(
                        "sent {} bytes as context_index={} ({} bytes on wire)",
                        line.len(),
                        sender.context_id(),
                        wire.len()
                    );
                }
                if let Err(e) = transport.send(remote, &wire) {
                    eprintln!("error: {}", e);
                }
            }
            Ok(None) => {
                // EOF on stdin: stop sending, keep draining the socket
                // briefly, then exit.
                break;
            }
            Err(mpsc::TryRecvError::Empty) => {}
            Err(mpsc::TryRecvError::Disconnected) => break,
        }

        match transport.recv(&mut recv_buf) {
            Ok(Some(n)) => match receiver.receive(&recv_buf[..n]) {
                Some(plaintext) => {
                    // The wire contract is binary; stdin lines arrive
                    // here with their newline already stripped, so the
                    // driver appends one back for line-oriented output.
                    let _ = out.write_all(&plaintext);
                    let _ = out.write_all(b"\n");
                    let _ = out.flush();
                }
                None => {
                    if args.verbose {
                        eprintln!("dropped {} bytes: invalid frame or MAC failure", n);
                    }
                }
            },
            Ok(None) => {}
            Err(e) => {
                if args.verbose {
                    eprintln!("transport error: {}", e);
                }
            }
        }
    }

    ExitCode::SUCCESS
}

/// Spawns a background thread that blocks on stdin line reads and
/// forwards them over an mpsc channel, standing in for the original
/// `select()` readiness wait over stdin without an async runtime.
/// Sends `None` once and exits on EOF.
fn spawn_stdin_reader() -> mpsc::Receiver<Option<String>> {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(text) => {
                    if tx.send(Some(text)).is_err() {
                        return;
                    }
                }
                Err(_) => break,
            }
        }
        let _ = tx.send(None);
    });
    rx
}
