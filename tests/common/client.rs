//! Test chat client.
//!
//! Sends one JSON request per line and reads plain text lines back.

use parlor_proto::Request;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::time::timeout;

/// A test chat client.
pub struct TestClient {
    reader: BufReader<OwnedReadHalf>,
    writer: BufWriter<OwnedWriteHalf>,
    username: String,
}

#[allow(dead_code)]
impl TestClient {
    /// Connect to a test server.
    pub async fn connect(address: SocketAddr, username: &str) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(address).await?;

        let (read_half, write_half) = stream.into_split();
        Ok(Self {
            reader: BufReader::new(read_half),
            writer: BufWriter::new(write_half),
            username: username.to_string(),
        })
    }

    /// Send raw bytes, adding a newline if missing.
    pub async fn send_raw(&mut self, line: &str) -> anyhow::Result<()> {
        self.writer.write_all(line.as_bytes()).await?;
        if !line.ends_with('\n') {
            self.writer.write_all(b"\n").await?;
        }
        self.writer.flush().await?;
        Ok(())
    }

    /// Send bytes exactly as given.
    pub async fn send_bytes(&mut self, data: &str) -> anyhow::Result<()> {
        self.writer.write_all(data.as_bytes()).await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Close the sending side; the server sees EOF.
    pub async fn shutdown(&mut self) -> anyhow::Result<()> {
        self.writer.shutdown().await?;
        Ok(())
    }

    pub async fn send(&mut self, request: &Request) -> anyhow::Result<()> {
        self.send_raw(&request.to_json()).await
    }

    pub async fn hello(&mut self) -> anyhow::Result<()> {
        let request = Request::hello(self.username.clone());
        self.send(&request).await
    }

    pub async fn say(&mut self, text: &str) -> anyhow::Result<()> {
        let request = Request::to_all(self.username.clone(), text);
        self.send(&request).await
    }

    pub async fn whisper(&mut self, receiver: &str, text: &str) -> anyhow::Result<()> {
        let request = Request::to_one(self.username.clone(), receiver, text);
        self.send(&request).await
    }

    /// Receive a single line from the server.
    pub async fn recv(&mut self) -> anyhow::Result<String> {
        self.recv_timeout(Duration::from_secs(5)).await
    }

    /// Receive a line with a timeout. EOF is an error.
    pub async fn recv_timeout(&mut self, dur: Duration) -> anyhow::Result<String> {
        let mut line = String::new();
        let read = timeout(dur, self.reader.read_line(&mut line)).await??;
        if read == 0 {
            anyhow::bail!("connection closed");
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    /// Receive lines until the predicate matches, inclusive.
    pub async fn recv_until<F>(&mut self, mut predicate: F) -> anyhow::Result<Vec<String>>
    where
        F: FnMut(&str) -> bool,
    {
        let mut lines = Vec::new();
        loop {
            let line = self.recv().await?;
            let done = predicate(&line);
            lines.push(line);
            if done {
                break;
            }
        }
        Ok(lines)
    }

    /// Assert nothing arrives within `dur`.
    pub async fn expect_silence(&mut self, dur: Duration) -> anyhow::Result<()> {
        match self.recv_timeout(dur).await {
            Ok(line) => anyhow::bail!("unexpected line: {line:?}"),
            Err(e) if e.is::<tokio::time::error::Elapsed>() => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Read every remaining line until the server closes the connection.
    pub async fn recv_to_close(&mut self) -> anyhow::Result<Vec<String>> {
        let mut rest = String::new();
        timeout(Duration::from_secs(10), self.reader.read_to_string(&mut rest)).await??;
        Ok(rest.lines().map(str::to_string).collect())
    }

    /// True once the server has closed the connection.
    pub async fn is_closed(&mut self) -> bool {
        let mut line = String::new();
        matches!(
            timeout(Duration::from_secs(2), self.reader.read_line(&mut line)).await,
            Ok(Ok(0)) | Ok(Err(_))
        )
    }
}
