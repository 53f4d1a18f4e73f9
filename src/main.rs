/*!
 * Feed Server - Main Entry Point
 *
 * Reads line-delimited JSON requests from stdin and writes responses to
 * stdout. The optional argument selects the number of consumer threads;
 * absent or <= 0 runs sequentially.
 */

use feed_server::{init_tracing, JsonLineSink, Server, ServerConfig};
use std::io::{self, BufReader, BufWriter};
use tracing::info;

fn main() -> miette::Result<()> {
    init_tracing();

    let config = ServerConfig::from_args(std::env::args().skip(1))?.with_env_overrides();
    let server = Server::new(config);

    let config = server.config();
    info!(
        mode = ?config.mode,
        max_readers = config.max_readers,
        idle_backoff_us = config.idle_backoff.as_micros() as u64,
        "feed server starting"
    );

    let sink = JsonLineSink::new(BufWriter::new(io::stdout()));
    server.run(BufReader::new(io::stdin()), &sink)?;

    Ok(())
}
