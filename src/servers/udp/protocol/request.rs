//! Parsing of the BEP 15 request packets.
use std::io::{Cursor, Read};
use std::net::Ipv4Addr;

use byteorder::{NetworkEndian, ReadBytesExt};
use swarm_tracker_primitives::announce_event::AnnounceEvent;
use swarm_tracker_primitives::info_hash::InfoHash;
use swarm_tracker_primitives::peer;
use thiserror::Error;

use super::{ConnectionId, PeerKey, Port, TransactionId, ACTION_ANNOUNCE, ACTION_CONNECT, ACTION_SCRAPE, PROTOCOL_ID};

/// A parsed request packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Connect(ConnectRequest),
    Announce(AnnounceRequest),
    Scrape(ScrapeRequest),
}

/// `connect` request: 16 bytes.
///
/// ```text
/// Offset  Size    Name
/// 0       64-bit  protocol_id (magic)
/// 8       32-bit  action (0)
/// 12      32-bit  transaction_id
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectRequest {
    pub transaction_id: TransactionId,
}

/// `announce` request: 98 bytes.
///
/// ```text
/// Offset  Size    Name
/// 0       64-bit  connection_id
/// 8       32-bit  action (1)
/// 12      32-bit  transaction_id
/// 16      20-byte info_hash
/// 36      20-byte peer_id
/// 56      64-bit  downloaded
/// 64      64-bit  left
/// 72      64-bit  uploaded
/// 80      32-bit  event
/// 84      32-bit  IP address (0 = use sender address)
/// 88      32-bit  key
/// 92      32-bit  num_want (-1 = default)
/// 96      16-bit  port
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnnounceRequest {
    pub connection_id: ConnectionId,
    pub transaction_id: TransactionId,
    pub info_hash: InfoHash,
    pub peer_id: peer::Id,
    pub bytes_downloaded: i64,
    pub bytes_left: i64,
    pub bytes_uploaded: i64,
    pub event: AnnounceEvent,
    /// The IP the client claims. `None` when zero. Ignored by this
    /// tracker; the datagram source address wins.
    pub ip_address: Option<Ipv4Addr>,
    pub key: PeerKey,
    /// How many peers the client wants. Negative means "tracker default".
    pub peers_wanted: i32,
    pub port: Port,
}

/// `scrape` request: 16 bytes plus 20 bytes per infohash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeRequest {
    pub connection_id: ConnectionId,
    pub transaction_id: TransactionId,
    pub info_hashes: Vec<InfoHash>,
}

/// Why a datagram could not be parsed as a request. The server never
/// answers these; a reply to garbage is amplification bait.
#[derive(Error, Debug)]
pub enum RequestParseError {
    #[error("packet too short for the claimed action")]
    NotEnoughBytes,

    #[error("connect request without the protocol magic")]
    InvalidProtocolId,

    #[error("unknown action: {action}")]
    InvalidAction { action: i32 },

    #[error("scrape request with no infohashes or more than {max} infohashes")]
    InvalidNumberOfInfoHashes { max: usize },
}

impl From<std::io::Error> for RequestParseError {
    fn from(_: std::io::Error) -> Self {
        RequestParseError::NotEnoughBytes
    }
}

impl Request {
    /// Parses one datagram.
    ///
    /// # Errors
    ///
    /// Will return an error if the packet is truncated, carries an unknown
    /// action, a `connect` without the protocol magic, or a `scrape` with
    /// an invalid number of infohashes.
    pub fn parse(bytes: &[u8], max_scrape_torrents: usize) -> Result<Request, RequestParseError> {
        let mut cursor = Cursor::new(bytes);

        let connection_prefix = cursor.read_i64::<NetworkEndian>()?;
        let action = cursor.read_i32::<NetworkEndian>()?;

        match action {
            ACTION_CONNECT => {
                if connection_prefix != PROTOCOL_ID {
                    return Err(RequestParseError::InvalidProtocolId);
                }

                let transaction_id = TransactionId(cursor.read_i32::<NetworkEndian>()?);

                Ok(Request::Connect(ConnectRequest { transaction_id }))
            }
            ACTION_ANNOUNCE => {
                let connection_id = ConnectionId(connection_prefix);
                let transaction_id = TransactionId(cursor.read_i32::<NetworkEndian>()?);

                let info_hash = InfoHash(read_20_bytes(&mut cursor)?);
                let peer_id = peer::Id(read_20_bytes(&mut cursor)?);

                let bytes_downloaded = cursor.read_i64::<NetworkEndian>()?;
                let bytes_left = cursor.read_i64::<NetworkEndian>()?;
                let bytes_uploaded = cursor.read_i64::<NetworkEndian>()?;

                let event = AnnounceEvent::from_i32(cursor.read_i32::<NetworkEndian>()?);

                let ip_address = match cursor.read_u32::<NetworkEndian>()? {
                    0 => None,
                    ip => Some(Ipv4Addr::from(ip)),
                };

                let key = PeerKey(cursor.read_u32::<NetworkEndian>()?);
                let peers_wanted = cursor.read_i32::<NetworkEndian>()?;
                let port = Port(cursor.read_u16::<NetworkEndian>()?);

                Ok(Request::Announce(AnnounceRequest {
                    connection_id,
                    transaction_id,
                    info_hash,
                    peer_id,
                    bytes_downloaded,
                    bytes_left,
                    bytes_uploaded,
                    event,
                    ip_address,
                    key,
                    peers_wanted,
                    port,
                }))
            }
            ACTION_SCRAPE => {
                let connection_id = ConnectionId(connection_prefix);
                let transaction_id = TransactionId(cursor.read_i32::<NetworkEndian>()?);

                let mut info_hashes = vec![];

                while let Ok(info_hash) = read_20_bytes(&mut cursor) {
                    info_hashes.push(InfoHash(info_hash));

                    if info_hashes.len() > max_scrape_torrents {
                        return Err(RequestParseError::InvalidNumberOfInfoHashes {
                            max: max_scrape_torrents,
                        });
                    }
                }

                if info_hashes.is_empty() {
                    return Err(RequestParseError::InvalidNumberOfInfoHashes {
                        max: max_scrape_torrents,
                    });
                }

                Ok(Request::Scrape(ScrapeRequest {
                    connection_id,
                    transaction_id,
                    info_hashes,
                }))
            }
            action => Err(RequestParseError::InvalidAction { action }),
        }
    }
}

fn read_20_bytes(cursor: &mut Cursor<&[u8]>) -> Result<[u8; 20], std::io::Error> {
    let mut buffer = [0u8; 20];
    cursor.read_exact(&mut buffer)?;
    Ok(buffer)
}
