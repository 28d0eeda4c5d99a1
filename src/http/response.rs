//! Response written by handlers that complete a request themselves.

pub trait Response {
    fn set_status(&mut self, status: u16);

    fn write_body(&mut self, body: &str);
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimpleResponse {
    status: Option<u16>,
    body: String,
}

impl SimpleResponse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Status set by a handler, if any.
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn body(&self) -> &str {
        &self.body
    }
}

impl Response for SimpleResponse {
    fn set_status(&mut self, status: u16) {
        self.status = Some(status);
    }

    fn write_body(&mut self, body: &str) {
        self.body.push_str(body);
    }
}
