#![cfg(feature = "alloc")]

use rand::RngExt;
use ubx_codec::{
    encode_frame, DecodeEvent, DecodeIter, Decoder, FixedLinearBuffer, LayoutDescriptor,
    LayoutError, MessageRegistry, MonVer, NavSat, ParserError, RegistryEntry, UnderlyingBuffer,
};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Event {
    Decoded {
        name: &'static str,
        records: Vec<Vec<u8>>,
    },
    Unknown {
        class: u8,
        id: u8,
        payload: Vec<u8>,
    },
    Malformed {
        class: u8,
        id: u8,
        reason: ParserError,
    },
}

fn collect_events<T: UnderlyingBuffer>(mut it: DecodeIter<T>) -> Vec<Event> {
    let mut ret = vec![];
    while let Some(event) = it.next() {
        ret.push(match event {
            DecodeEvent::Decoded(msg) => Event::Decoded {
                name: msg.name,
                records: msg.view.repeated().map(|r| r.to_vec()).collect(),
            },
            DecodeEvent::Unknown(msg) => Event::Unknown {
                class: msg.class,
                id: msg.id,
                payload: msg.payload.to_vec(),
            },
            DecodeEvent::Malformed(msg) => Event::Malformed {
                class: msg.class,
                id: msg.id,
                reason: msg.reason,
            },
        });
    }
    ret
}

fn mon_ver_payload(extensions: usize) -> Vec<u8> {
    (0..40 + extensions * 30).map(|i| i as u8).collect()
}

fn decoded_mon_ver(payload: &[u8]) -> Event {
    Event::Decoded {
        name: "MON-VER",
        records: payload[40..].chunks(30).map(|c| c.to_vec()).collect(),
    }
}

#[test]
fn corrupted_frame_then_valid_frame() {
    let payload = mon_ver_payload(2);
    let mut bad = encode_frame(0x0a, 0x04, &payload).unwrap();
    bad[20] ^= 0x01;
    let good = encode_frame(0x0a, 0x04, &payload).unwrap();

    let mut stream = bad;
    stream.extend_from_slice(&good);

    let mut decoder = Decoder::default();
    let events = collect_events(decoder.consume(&stream));
    assert_eq!(events.len(), 2);
    assert!(matches!(
        events[0],
        Event::Malformed {
            class: 0x0a,
            id: 0x04,
            reason: ParserError::ChecksumMismatch { .. }
        }
    ));
    assert_eq!(events[1], decoded_mon_ver(&payload));
}

#[test]
fn mon_ver_two_extensions() {
    let payload = mon_ver_payload(2);
    assert_eq!(payload.len(), 100);
    let frame = encode_frame(0x0a, 0x04, &payload).unwrap();

    let mut decoder = Decoder::default();
    let events = collect_events(decoder.consume(&frame));
    assert_eq!(events, vec![decoded_mon_ver(&payload)]);
    if let Event::Decoded { records, .. } = &events[0] {
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.len() == 30));
    }
}

#[test]
fn mon_ver_with_leftover_bytes() {
    let frame = encode_frame(0x0a, 0x04, &[0; 95]).unwrap();

    let mut decoder = Decoder::default();
    assert_eq!(
        collect_events(decoder.consume(&frame)),
        vec![Event::Malformed {
            class: 0x0a,
            id: 0x04,
            reason: ParserError::LayoutMismatch(LayoutError::TrailingBytes {
                fixed_size: 40,
                record_size: 30,
                got: 95
            })
        }]
    );
}

#[test]
fn unregistered_message_is_unknown() {
    let frame = encode_frame(0x7f, 0x01, &[1, 2, 3]).unwrap();

    let mut decoder = Decoder::default();
    assert_eq!(
        collect_events(decoder.consume(&frame)),
        vec![Event::Unknown {
            class: 0x7f,
            id: 0x01,
            payload: vec![1, 2, 3]
        }]
    );
}

#[test]
fn frame_split_after_five_bytes() {
    let payload = mon_ver_payload(1);
    let frame = encode_frame(0x0a, 0x04, &payload).unwrap();

    let mut decoder = Decoder::default();
    assert!(collect_events(decoder.consume(&frame[..5])).is_empty());
    let split = collect_events(decoder.consume(&frame[5..]));

    let mut decoder = Decoder::default();
    let whole = collect_events(decoder.consume(&frame));
    assert_eq!(split, whole);
    assert_eq!(whole, vec![decoded_mon_ver(&payload)]);
}

#[test]
fn custom_registry_and_fixed_memory() {
    static TABLE: [RegistryEntry; 1] = [RegistryEntry::new(
        0x05,
        0x01,
        "ACK-ACK",
        LayoutDescriptor::fixed(2),
    )];
    let registry = MessageRegistry::new(&TABLE).unwrap();

    let mut stream = encode_frame(0x05, 0x01, &[0x06, 0x01]).unwrap();
    stream.extend(encode_frame(0x0a, 0x04, &mon_ver_payload(0)).unwrap());

    let mut storage = [0; 64];
    let mut decoder = Decoder::new(registry, FixedLinearBuffer::new(&mut storage));
    let events = collect_events(decoder.consume(&stream));
    assert_eq!(
        events[0],
        Event::Decoded {
            name: "ACK-ACK",
            records: vec![]
        }
    );
    assert!(matches!(
        events[1],
        Event::Unknown {
            class: 0x0a,
            id: 0x04,
            ..
        }
    ));
}

#[test]
fn typed_overlays_from_stream() {
    let mut nav_sat = vec![0; 8 + 12];
    nav_sat[..4].copy_from_slice(&1000u32.to_le_bytes());
    nav_sat[4] = 1;
    nav_sat[5] = 1;
    nav_sat[8] = 2;
    nav_sat[9] = 11;

    let mut stream = encode_frame(0x01, 0x35, &nav_sat).unwrap();
    stream.extend(encode_frame(0x0a, 0x04, &mon_ver_payload(1)).unwrap());

    let mut decoder = Decoder::default();
    let mut it = decoder.consume(&stream);

    let Some(DecodeEvent::Decoded(msg)) = it.next() else {
        panic!("expected NAV-SAT");
    };
    let sat = msg.overlay::<NavSat>().unwrap();
    assert_eq!(sat.itow(), 1000);
    let sv = sat.svs().next().unwrap();
    assert_eq!((sv.gnss_id(), sv.sv_id()), (2, 11));

    let Some(DecodeEvent::Decoded(msg)) = it.next() else {
        panic!("expected MON-VER");
    };
    assert!(msg.overlay::<NavSat>().is_none());
    assert_eq!(msg.overlay::<MonVer>().map(|v| v.extensions().len()), Some(1));
    assert!(it.next().is_none());
}

#[test]
fn random_chunking_matches_single_delivery() {
    let mut stream = Vec::new();
    for n in 0..20 {
        stream.extend_from_slice(&[0x00, 0xb5, 0x13]);
        stream.extend(encode_frame(0x0a, 0x04, &mon_ver_payload(n % 4)).unwrap());
        stream.extend(encode_frame(0x05, 0x01, &[0x06, n as u8]).unwrap());
        stream.extend(encode_frame(0x7f, n as u8, &[]).unwrap());
    }
    let mut broken = encode_frame(0x01, 0x35, &[0; 20]).unwrap();
    broken[10] ^= 0xff;
    stream.extend(broken);

    let mut decoder = Decoder::default();
    let expected = collect_events(decoder.consume(&stream));
    assert_eq!(expected.len(), 61);
    assert_eq!(
        expected.iter().filter(|e| matches!(e, Event::Malformed { .. })).count(),
        1
    );

    let mut rng = rand::rng();
    for _ in 0..10 {
        let mut decoder = Decoder::default();
        let mut events = Vec::new();
        let mut rest = stream.as_slice();
        while !rest.is_empty() {
            let chunk: usize = rng.random_range(1..64);
            let (buf, tail) = rest.split_at(chunk.min(rest.len()));
            rest = tail;
            events.extend(collect_events(decoder.consume(buf)));
        }
        assert_eq!(events, expected);
        assert!(decoder.scanner().is_buffer_empty());
    }
}
