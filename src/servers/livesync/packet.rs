//! The live-sync wire format.
//!
//! One packet is a fixed header followed by fixed-size records:
//!
//! ```text
//! Offset  Size     Name
//! 0       32-bit   packet magic
//! 4       32-bit   sender instance id
//! 8       39-byte  record 0
//! 47      39-byte  record 1
//! ...
//! ```
//!
//! Each record:
//!
//! ```text
//! Offset  Size     Name
//! 0       20-byte  infohash
//! 20      16-byte  peer IP (IPv4 mapped into IPv6)
//! 36      16-bit   peer port
//! 38      8-bit    flags (SEEDER | COMPLETED | STOPPED)
//! ```
//!
//! Peer ids do not travel: the peer store keys peers by socket address,
//! and replayed peers carry a fixed synthetic id.
use std::io::{Cursor, Read, Write};
use std::net::{IpAddr, Ipv6Addr, SocketAddr};

use byteorder::{NetworkEndian, ReadBytesExt, WriteBytesExt};
use swarm_tracker_primitives::announce_event::AnnounceEvent;
use swarm_tracker_primitives::info_hash::InfoHash;
use swarm_tracker_primitives::{peer, DurationSinceUnixEpoch, NumberOfBytes};
use thiserror::Error;

use crate::core::sync::PeerEvent;

/// The packet magic: `SYNC` in ASCII.
pub const PACKET_MAGIC: u32 = 0x5359_4E43;

pub const HEADER_SIZE: usize = 8;
pub const RECORD_SIZE: usize = 39;

/// Records are bundled until the encoded packet would cross this budget,
/// staying under one ethernet MTU.
pub const PACKET_SIZE_BUDGET: usize = 1400;

/// The synthetic peer id attached to replayed peers.
pub const SYNC_PEER_ID: peer::Id = peer::Id(*b"-SY0000-000000000000");

const FLAG_SEEDER: u8 = 0b0000_0001;
const FLAG_COMPLETED: u8 = 0b0000_0010;
const FLAG_STOPPED: u8 = 0b0000_0100;

/// One peer delta on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncRecord {
    pub info_hash: InfoHash,
    pub peer_addr: SocketAddr,
    pub seeder: bool,
    pub completed: bool,
    pub stopped: bool,
}

impl From<PeerEvent> for SyncRecord {
    fn from(event: PeerEvent) -> Self {
        Self {
            info_hash: event.info_hash,
            peer_addr: event.peer.peer_addr,
            seeder: event.peer.is_seeder(),
            completed: event.peer.event == AnnounceEvent::Completed,
            stopped: event.peer.event == AnnounceEvent::Stopped,
        }
    }
}

impl SyncRecord {
    /// Rebuilds a peer for replay. Counters do not travel over the wire;
    /// the flags carry just enough to keep the swarm statistics right.
    #[must_use]
    pub fn to_peer(&self, now: DurationSinceUnixEpoch) -> peer::Peer {
        let event = if self.stopped {
            AnnounceEvent::Stopped
        } else if self.completed {
            AnnounceEvent::Completed
        } else {
            AnnounceEvent::Started
        };

        peer::Peer {
            peer_id: SYNC_PEER_ID,
            peer_addr: self.peer_addr,
            updated: now,
            uploaded: NumberOfBytes(0),
            downloaded: NumberOfBytes(0),
            left: if self.seeder { NumberOfBytes(0) } else { NumberOfBytes(1) },
            event,
        }
    }
}

/// A decoded live-sync packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncPacket {
    pub instance_id: u32,
    pub records: Vec<SyncRecord>,
}

/// Why a datagram could not be decoded as a live-sync packet.
#[derive(Error, Debug)]
pub enum PacketParseError {
    #[error("packet without the live-sync magic")]
    InvalidMagic,

    #[error("packet size does not match a whole number of records")]
    InvalidSize,
}

impl SyncPacket {
    #[must_use]
    pub fn new(instance_id: u32, records: Vec<SyncRecord>) -> Self {
        Self { instance_id, records }
    }

    /// The encoded size of a packet with `records` records.
    #[must_use]
    pub fn encoded_size(records: usize) -> usize {
        HEADER_SIZE + records * RECORD_SIZE
    }

    /// Encodes the packet.
    ///
    /// # Panics
    ///
    /// Never panics; writing into a `Vec` cannot fail.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(Self::encoded_size(self.records.len()));

        bytes.write_u32::<NetworkEndian>(PACKET_MAGIC).expect("writing to a vec");
        bytes.write_u32::<NetworkEndian>(self.instance_id).expect("writing to a vec");

        for record in &self.records {
            bytes.write_all(&record.info_hash.0).expect("writing to a vec");

            let ip = match record.peer_addr.ip() {
                IpAddr::V4(ip) => ip.to_ipv6_mapped(),
                IpAddr::V6(ip) => ip,
            };
            bytes.write_all(&ip.octets()).expect("writing to a vec");

            bytes
                .write_u16::<NetworkEndian>(record.peer_addr.port())
                .expect("writing to a vec");

            let mut flags = 0u8;
            if record.seeder {
                flags |= FLAG_SEEDER;
            }
            if record.completed {
                flags |= FLAG_COMPLETED;
            }
            if record.stopped {
                flags |= FLAG_STOPPED;
            }
            bytes.write_u8(flags).expect("writing to a vec");
        }

        bytes
    }

    /// Decodes one datagram.
    ///
    /// # Errors
    ///
    /// Will return `Err` if the magic is missing or the size is not a
    /// whole number of records.
    pub fn decode(bytes: &[u8]) -> Result<SyncPacket, PacketParseError> {
        if bytes.len() < HEADER_SIZE || (bytes.len() - HEADER_SIZE) % RECORD_SIZE != 0 {
            return Err(PacketParseError::InvalidSize);
        }

        let mut cursor = Cursor::new(bytes);

        let magic = cursor.read_u32::<NetworkEndian>().map_err(|_| PacketParseError::InvalidSize)?;
        if magic != PACKET_MAGIC {
            return Err(PacketParseError::InvalidMagic);
        }

        let instance_id = cursor.read_u32::<NetworkEndian>().map_err(|_| PacketParseError::InvalidSize)?;

        let number_of_records = (bytes.len() - HEADER_SIZE) / RECORD_SIZE;
        let mut records = Vec::with_capacity(number_of_records);

        for _ in 0..number_of_records {
            let mut info_hash = [0u8; 20];
            cursor.read_exact(&mut info_hash).map_err(|_| PacketParseError::InvalidSize)?;

            let mut ip_octets = [0u8; 16];
            cursor.read_exact(&mut ip_octets).map_err(|_| PacketParseError::InvalidSize)?;

            let port = cursor.read_u16::<NetworkEndian>().map_err(|_| PacketParseError::InvalidSize)?;
            let flags = cursor.read_u8().map_err(|_| PacketParseError::InvalidSize)?;

            let ipv6 = Ipv6Addr::from(ip_octets);
            let ip = match ipv6.to_ipv4_mapped() {
                Some(ipv4) => IpAddr::V4(ipv4),
                None => IpAddr::V6(ipv6),
            };

            records.push(SyncRecord {
                info_hash: InfoHash(info_hash),
                peer_addr: SocketAddr::new(ip, port),
                seeder: flags & FLAG_SEEDER != 0,
                completed: flags & FLAG_COMPLETED != 0,
                stopped: flags & FLAG_STOPPED != 0,
            });
        }

        Ok(SyncPacket { instance_id, records })
    }
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

    use swarm_tracker_primitives::info_hash::InfoHash;

    use super::{SyncPacket, SyncRecord, HEADER_SIZE, RECORD_SIZE};

    fn sample_record() -> SyncRecord {
        SyncRecord {
            info_hash: InfoHash([0x69; 20]),
            peer_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::new(126, 0, 0, 1)), 6881),
            seeder: true,
            completed: false,
            stopped: false,
        }
    }

    #[test]
    fn a_packet_should_decode_to_what_was_encoded() {
        let packet = SyncPacket::new(42, vec![sample_record()]);

        let decoded = SyncPacket::decode(&packet.encode()).unwrap();

        assert_eq!(decoded, packet);
    }

    #[test]
    fn an_ipv4_peer_should_survive_the_ipv6_mapping() {
        let packet = SyncPacket::new(42, vec![sample_record()]);

        let decoded = SyncPacket::decode(&packet.encode()).unwrap();

        assert_eq!(
            decoded.records[0].peer_addr,
            SocketAddr::new(IpAddr::V4(Ipv4Addr::new(126, 0, 0, 1)), 6881)
        );
    }

    #[test]
    fn an_ipv6_peer_should_be_kept_as_ipv6() {
        let mut record = sample_record();
        record.peer_addr = SocketAddr::new(IpAddr::V6(Ipv6Addr::new(0x6969, 0, 0, 0, 0, 0, 0, 1)), 6881);

        let packet = SyncPacket::new(42, vec![record]);
        let decoded = SyncPacket::decode(&packet.encode()).unwrap();

        assert_eq!(decoded.records[0].peer_addr, record.peer_addr);
    }

    #[test]
    fn the_encoded_size_should_be_the_header_plus_one_record_slot_each() {
        let packet = SyncPacket::new(42, vec![sample_record(), sample_record()]);

        assert_eq!(packet.encode().len(), HEADER_SIZE + 2 * RECORD_SIZE);
    }

    #[test]
    fn it_should_reject_a_packet_with_the_wrong_magic() {
        let mut bytes = SyncPacket::new(42, vec![sample_record()]).encode();
        bytes[0] = 0xff;

        assert!(SyncPacket::decode(&bytes).is_err());
    }

    #[test]
    fn it_should_reject_a_packet_with_a_partial_record() {
        let mut bytes = SyncPacket::new(42, vec![sample_record()]).encode();
        bytes.truncate(bytes.len() - 1);

        assert!(SyncPacket::decode(&bytes).is_err());
    }

    mod replaying_a_record {
        use swarm_tracker_primitives::announce_event::AnnounceEvent;
        use swarm_tracker_primitives::DurationSinceUnixEpoch;

        use super::sample_record;

        #[test]
        fn a_seeder_record_should_become_a_seeder_peer() {
            let peer = sample_record().to_peer(DurationSinceUnixEpoch::from_secs(1_669_397_478));

            assert!(peer.is_seeder());
            assert_eq!(peer.updated, DurationSinceUnixEpoch::from_secs(1_669_397_478));
        }

        #[test]
        fn a_stopped_record_should_become_a_stopped_peer() {
            let mut record = sample_record();
            record.stopped = true;

            let peer = record.to_peer(DurationSinceUnixEpoch::from_secs(1_669_397_478));

            assert_eq!(peer.event, AnnounceEvent::Stopped);
        }
    }
}
