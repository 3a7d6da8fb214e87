#[macro_use]
extern crate afl;

use ubx_codec::{DecodeEvent, Decoder, FixedLinearBuffer, MessageRegistry};

const ACK_ACK: [u8; 10] = [0xb5, 0x62, 0x5, 0x1, 0x2, 0x0, 0x4, 0x5, 0x11, 0x38];

fn is_ack_ack(event: &DecodeEvent) -> bool {
    matches!(event, DecodeEvent::Decoded(msg) if msg.name == "ACK-ACK")
}

fn decode(chunksize: usize, max_payload_len: usize, data: &[u8]) {
    // A frame split across chunks only fits if it is no longer than an ACK-ACK,
    // larger split frames are rejected as out of memory
    let mut buf = [0; 10];
    let buf = FixedLinearBuffer::new(&mut buf);
    let mut decoder =
        Decoder::new(MessageRegistry::builtin(), buf).with_max_payload_len(max_payload_len);
    for chunk in data.chunks(chunksize) {
        let mut it = decoder.consume(chunk);
        while let Some(event) = it.next() {
            if let DecodeEvent::Decoded(msg) = event {
                // Every decoded view must cover its payload exactly
                let layout = msg.view.layout();
                assert_eq!(
                    msg.view.payload().len(),
                    layout.payload_len(msg.view.record_count())
                );
                assert_eq!(msg.view.repeated().count(), msg.view.record_count());
            }
        }
    }

    {
        // Clear out the buffer
        let mut num_acks = 0;
        let mut it = decoder.consume(&ACK_ACK);
        while let Some(event) = it.next() {
            if is_ack_ack(&event) {
                num_acks += 1;
            }
        }
        // We could conceivably end up with >1 ack, if the underlying buffer ended in
        // a too-large frame, a subset of which was an ack.
        assert!(num_acks >= 1);
    }
    let mut it = decoder.consume(&ACK_ACK);
    let Some(event) = it.next() else {
        panic!("ACK-ACK swallowed after resync");
    };
    assert!(is_ack_ack(&event));
    assert!(it.next().is_none());
}

fn main() {
    fuzz!(|data: &[u8]| {
        if data.len() > 2 {
            let chunksize = usize::from(data[0]);
            let max_payload_len = usize::from(data[1]).max(2);
            if chunksize != 0 {
                decode(chunksize, max_payload_len, &data[2..]);
            }
        }
    });
}
