//! Writing of the BEP 15 response packets.
use std::borrow::Cow;
use std::io::Write;
use std::net::{Ipv4Addr, Ipv6Addr};

use byteorder::{NetworkEndian, WriteBytesExt};

use super::{
    AnnounceInterval, ConnectionId, NumberOfDownloads, NumberOfPeers, Port, TransactionId, ACTION_ANNOUNCE, ACTION_CONNECT,
    ACTION_ERROR, ACTION_SCRAPE,
};

/// A response packet, ready to be written into a datagram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Connect(ConnectResponse),
    AnnounceIpv4(AnnounceResponse<Ipv4Addr>),
    AnnounceIpv6(AnnounceResponse<Ipv6Addr>),
    Scrape(ScrapeResponse),
    Error(ErrorResponse),
}

/// An IP address that can be written as a compact peer entry: 4 bytes for
/// v4, 16 for v6.
pub trait Ip: Clone + Copy + std::fmt::Debug + PartialEq + Eq {
    /// # Errors
    ///
    /// Will return `Err` if the writer fails.
    fn write_bytes(&self, writer: &mut impl Write) -> Result<(), std::io::Error>;
}

impl Ip for Ipv4Addr {
    fn write_bytes(&self, writer: &mut impl Write) -> Result<(), std::io::Error> {
        writer.write_all(&self.octets())
    }
}

impl Ip for Ipv6Addr {
    fn write_bytes(&self, writer: &mut impl Write) -> Result<(), std::io::Error> {
        writer.write_all(&self.octets())
    }
}

/// `connect` response: 16 bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectResponse {
    pub transaction_id: TransactionId,
    pub connection_id: ConnectionId,
}

/// `announce` response: 20 bytes plus one compact entry per peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnounceResponse<I: Ip> {
    pub transaction_id: TransactionId,
    pub announce_interval: AnnounceInterval,
    pub leechers: NumberOfPeers,
    pub seeders: NumberOfPeers,
    pub peers: Vec<ResponsePeer<I>>,
}

/// One compact peer entry in an `announce` response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponsePeer<I: Ip> {
    pub ip_address: I,
    pub port: Port,
}

/// `scrape` response: 8 bytes plus 12 bytes per infohash, in request
/// order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeResponse {
    pub transaction_id: TransactionId,
    pub torrent_stats: Vec<TorrentScrapeStatistics>,
}

/// The aggregate counters for one scraped infohash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TorrentScrapeStatistics {
    pub seeders: NumberOfPeers,
    pub completed: NumberOfDownloads,
    pub leechers: NumberOfPeers,
}

/// `error` response: 8 bytes plus the message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorResponse {
    pub transaction_id: TransactionId,
    pub message: Cow<'static, str>,
}

impl From<ConnectResponse> for Response {
    fn from(response: ConnectResponse) -> Self {
        Response::Connect(response)
    }
}

impl From<AnnounceResponse<Ipv4Addr>> for Response {
    fn from(response: AnnounceResponse<Ipv4Addr>) -> Self {
        Response::AnnounceIpv4(response)
    }
}

impl From<AnnounceResponse<Ipv6Addr>> for Response {
    fn from(response: AnnounceResponse<Ipv6Addr>) -> Self {
        Response::AnnounceIpv6(response)
    }
}

impl From<ScrapeResponse> for Response {
    fn from(response: ScrapeResponse) -> Self {
        Response::Scrape(response)
    }
}

impl From<ErrorResponse> for Response {
    fn from(response: ErrorResponse) -> Self {
        Response::Error(response)
    }
}

impl Response {
    /// Writes the packet.
    ///
    /// # Errors
    ///
    /// Will return `Err` if the writer fails, which cannot happen for the
    /// in-memory buffers the server uses.
    pub fn write_bytes(&self, writer: &mut impl Write) -> Result<(), std::io::Error> {
        match self {
            Response::Connect(response) => {
                writer.write_i32::<NetworkEndian>(ACTION_CONNECT)?;
                writer.write_i32::<NetworkEndian>(response.transaction_id.0)?;
                writer.write_i64::<NetworkEndian>(response.connection_id.0)?;
            }
            Response::AnnounceIpv4(response) => {
                response.write_bytes(writer)?;
            }
            Response::AnnounceIpv6(response) => {
                response.write_bytes(writer)?;
            }
            Response::Scrape(response) => {
                writer.write_i32::<NetworkEndian>(ACTION_SCRAPE)?;
                writer.write_i32::<NetworkEndian>(response.transaction_id.0)?;

                for stats in &response.torrent_stats {
                    writer.write_i32::<NetworkEndian>(stats.seeders.0)?;
                    writer.write_i32::<NetworkEndian>(stats.completed.0)?;
                    writer.write_i32::<NetworkEndian>(stats.leechers.0)?;
                }
            }
            Response::Error(response) => {
                writer.write_i32::<NetworkEndian>(ACTION_ERROR)?;
                writer.write_i32::<NetworkEndian>(response.transaction_id.0)?;
                writer.write_all(response.message.as_bytes())?;
            }
        }

        Ok(())
    }
}

impl<I: Ip> AnnounceResponse<I> {
    fn write_bytes(&self, writer: &mut impl Write) -> Result<(), std::io::Error> {
        writer.write_i32::<NetworkEndian>(ACTION_ANNOUNCE)?;
        writer.write_i32::<NetworkEndian>(self.transaction_id.0)?;
        writer.write_i32::<NetworkEndian>(self.announce_interval.0)?;
        writer.write_i32::<NetworkEndian>(self.leechers.0)?;
        writer.write_i32::<NetworkEndian>(self.seeders.0)?;

        for peer in &self.peers {
            peer.ip_address.write_bytes(writer)?;
            writer.write_u16::<NetworkEndian>(peer.port.0)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use super::{
        AnnounceInterval, AnnounceResponse, ConnectResponse, ConnectionId, ErrorResponse, NumberOfDownloads, NumberOfPeers,
        Port, Response, ResponsePeer, ScrapeResponse, TorrentScrapeStatistics, TransactionId,
    };

    fn write(response: &Response) -> Vec<u8> {
        let mut bytes = vec![];
        response.write_bytes(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn a_connect_response_should_be_16_bytes() {
        let response = Response::from(ConnectResponse {
            transaction_id: TransactionId(42),
            connection_id: ConnectionId(0x1122_3344_5566_7788),
        });

        let bytes = write(&response);

        assert_eq!(
            bytes,
            [
                0, 0, 0, 0, // action
                0, 0, 0, 42, // transaction id
                0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, // connection id
            ]
        );
    }

    #[test]
    fn an_announce_response_should_append_6_byte_compact_entries() {
        let response = Response::from(AnnounceResponse {
            transaction_id: TransactionId(42),
            announce_interval: AnnounceInterval(120),
            leechers: NumberOfPeers(1),
            seeders: NumberOfPeers(2),
            peers: vec![ResponsePeer {
                ip_address: Ipv4Addr::new(126, 0, 0, 1),
                port: Port(6881),
            }],
        });

        let bytes = write(&response);

        assert_eq!(bytes.len(), 20 + 6);
        assert_eq!(&bytes[20..], [126, 0, 0, 1, 0x1a, 0xe1]);
    }

    #[test]
    fn a_scrape_response_should_have_12_bytes_per_infohash() {
        let response = Response::from(ScrapeResponse {
            transaction_id: TransactionId(42),
            torrent_stats: vec![TorrentScrapeStatistics {
                seeders: NumberOfPeers(1),
                completed: NumberOfDownloads(2),
                leechers: NumberOfPeers(3),
            }],
        });

        let bytes = write(&response);

        assert_eq!(
            bytes,
            [
                0, 0, 0, 2, // action
                0, 0, 0, 42, // transaction id
                0, 0, 0, 1, // seeders
                0, 0, 0, 2, // completed
                0, 0, 0, 3, // leechers
            ]
        );
    }

    #[test]
    fn an_error_response_should_append_the_message_bytes() {
        let response = Response::from(ErrorResponse {
            transaction_id: TransactionId(42),
            message: "access denied".into(),
        });

        let bytes = write(&response);

        assert_eq!(&bytes[..8], [0, 0, 0, 3, 0, 0, 0, 42]);
        assert_eq!(&bytes[8..], b"access denied");
    }
}
