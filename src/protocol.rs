use std::net::SocketAddr;

use log::debug;
use reqwest::blocking::Client;

use crate::error::Error;

#[cfg(test)]
use std::{cell::RefCell, collections::VecDeque, rc::Rc};

const HTTP_PORT: u16 = 80;

// Build the request URL for a device path; the port is omitted when it is the HTTP default
pub fn url(addr: SocketAddr, path: &str) -> String {
    if addr.port() == HTTP_PORT {
        format!("http://{}{}", addr.ip(), path)
    } else {
        format!("http://{}{}", addr, path)
    }
}

pub trait Protocol {
    /// Issue a GET for `path` on the device and return the response body
    fn get(&self, addr: SocketAddr, path: &str) -> Result<String, Error>;
}

pub struct DefaultProtocol {
    client: Client,
}

impl DefaultProtocol {
    pub fn new() -> DefaultProtocol {
        DefaultProtocol::with_client(Client::new())
    }

    /// Use a preconfigured client, e.g. one with a request timeout
    pub fn with_client(client: Client) -> DefaultProtocol {
        DefaultProtocol { client }
    }
}

impl Default for DefaultProtocol {
    fn default() -> Self {
        DefaultProtocol::new()
    }
}

impl Protocol for DefaultProtocol {
    fn get(&self, addr: SocketAddr, path: &str) -> Result<String, Error> {
        let url = url(addr, path);
        debug!("GET {}", url);

        let resp = self.client.get(&url).send()?.error_for_status()?;
        let body = resp.text()?;
        debug!("{} answered with {} bytes", addr, body.len());

        Ok(body)
    }
}

#[cfg(test)]
#[derive(Clone, Default)]
pub struct ProtocolMock {
    reqs: Rc<RefCell<Vec<(String, String)>>>,
    resps: Rc<RefCell<VecDeque<Result<String, Error>>>>,
}

#[cfg(test)]
impl ProtocolMock {
    pub fn new() -> ProtocolMock {
        ProtocolMock::default()
    }

    pub fn set_get_return_value(&self, resp: Result<String, Error>) {
        self.resps.borrow_mut().push_back(resp);
    }

    /// Paths requested so far, in order
    pub fn paths(&self) -> Vec<String> {
        self.reqs.borrow().iter().map(|(_, path)| path.clone()).collect()
    }

    pub fn last_addr(&self) -> Option<String> {
        self.reqs.borrow().last().map(|(addr, _)| addr.clone())
    }
}

#[cfg(test)]
impl Protocol for ProtocolMock {
    fn get(&self, addr: SocketAddr, path: &str) -> Result<String, Error> {
        self.reqs
            .borrow_mut()
            .push((addr.to_string(), path.to_string()));
        self.resps
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Ok(String::from("{}")))
    }
}
