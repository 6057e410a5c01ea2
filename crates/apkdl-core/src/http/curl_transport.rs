//! libcurl-backed [`Transport`].

use super::parse::{parse_headers, push_header_line};
use super::{BodySink, RequestSpec, ResponseHead, Transport, TransportError};
use curl::easy::{Easy, List};
use std::cell::RefCell;
use std::time::Duration;

/// Blocking transport: one `Easy` handle per request, redirects followed.
#[derive(Debug, Clone)]
pub struct CurlTransport {
    connect_timeout: Duration,
    /// Receive buffer size for streamed bodies (None = libcurl default).
    buffer_size: Option<usize>,
}

impl CurlTransport {
    pub fn new(connect_timeout: Duration, buffer_size: Option<usize>) -> Self {
        Self {
            connect_timeout,
            buffer_size,
        }
    }

    fn easy(&self, req: &RequestSpec) -> Result<Easy, TransportError> {
        let mut easy = Easy::new();
        easy.url(&req.url)?;
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        // Error bodies never reach the write callback.
        easy.fail_on_error(true)?;
        easy.connect_timeout(self.connect_timeout)?;
        easy.timeout(req.timeout)?;
        if let Some(stall) = req.stall {
            easy.low_speed_limit(stall.min_bytes_per_sec)?;
            easy.low_speed_time(stall.window)?;
        }

        let mut list = List::new();
        for (k, v) in &req.headers {
            list.append(&format!("{}: {}", k.trim(), v.trim()))?;
        }
        if !req.headers.is_empty() {
            easy.http_headers(list)?;
        }
        Ok(easy)
    }
}

/// Maps a failed `perform` to the most specific transport error.
fn perform_error(easy: &mut Easy, e: curl::Error) -> TransportError {
    if e.is_http_returned_error() {
        if let Ok(code) = easy.response_code() {
            return TransportError::Http(code);
        }
    }
    TransportError::Curl(e)
}

fn check_status(easy: &mut Easy) -> Result<(), TransportError> {
    let code = easy.response_code()?;
    if !(200..300).contains(&code) {
        return Err(TransportError::Http(code));
    }
    Ok(())
}

impl Transport for CurlTransport {
    fn get_page(&self, req: &RequestSpec) -> Result<String, TransportError> {
        let mut body: Vec<u8> = Vec::new();
        let mut easy = self.easy(req)?;
        // Pages may be compressed; package streams never are.
        easy.accept_encoding("")?;

        let result = {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()
        };
        if let Err(e) = result {
            return Err(perform_error(&mut easy, e));
        }
        check_status(&mut easy)?;

        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    fn stream(
        &self,
        req: &RequestSpec,
        sink: &mut dyn BodySink,
    ) -> Result<ResponseHead, TransportError> {
        let lines: RefCell<Vec<String>> = RefCell::new(Vec::new());
        let mut head: Option<ResponseHead> = None;
        let mut sink_error: Option<std::io::Error> = None;

        let mut easy = self.easy(req)?;
        if let Some(sz) = self.buffer_size {
            easy.buffer_size(sz)?;
        }

        let result = {
            let mut transfer = easy.transfer();
            transfer.header_function(|data| {
                push_header_line(&mut lines.borrow_mut(), data);
                true
            })?;
            transfer.write_function(|data| {
                if head.is_none() {
                    let parsed = parse_headers(&lines.borrow());
                    if let Err(e) = sink.on_head(&parsed) {
                        sink_error = Some(e);
                        return Ok(0); // abort transfer
                    }
                    head = Some(parsed);
                }
                match sink.on_chunk(data) {
                    Ok(()) => Ok(data.len()),
                    Err(e) => {
                        sink_error = Some(e);
                        Ok(0)
                    }
                }
            })?;
            transfer.perform()
        };

        if let Err(e) = result {
            if e.is_write_error() {
                if let Some(io_err) = sink_error.take() {
                    return Err(TransportError::Storage(io_err));
                }
            }
            return Err(perform_error(&mut easy, e));
        }
        check_status(&mut easy)?;

        match head {
            Some(h) => Ok(h),
            None => {
                // Empty body: the write callback never ran.
                let parsed = parse_headers(&lines.borrow());
                sink.on_head(&parsed)?;
                Ok(parsed)
            }
        }
    }
}
