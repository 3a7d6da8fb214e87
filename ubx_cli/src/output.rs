use serde_json::json;
use std::collections::BTreeMap;
use ubx_codec::{DecodeEvent, DecodedMessage, MonVer, NavSat, NavSatSvFlags};

use crate::cli::OutputFormat;

/// Event counts, keyed by message name.
#[derive(Debug, Default)]
pub struct Summary {
    decoded: BTreeMap<&'static str, usize>,
    unknown: BTreeMap<(u8, u8), usize>,
    malformed: usize,
}

impl Summary {
    pub fn record(&mut self, event: &DecodeEvent) {
        match event {
            DecodeEvent::Decoded(msg) => *self.decoded.entry(msg.name).or_default() += 1,
            DecodeEvent::Unknown(msg) => *self.unknown.entry((msg.class, msg.id)).or_default() += 1,
            DecodeEvent::Malformed(_) => self.malformed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.decoded.values().sum::<usize>() + self.unknown.values().sum::<usize>() + self.malformed
    }

    pub fn render(&self, format: OutputFormat) -> String {
        match format {
            OutputFormat::Text => {
                let mut out = String::new();
                for (name, count) in &self.decoded {
                    out.push_str(&format!("{:<12} {}\n", name, count));
                }
                for ((class, id), count) in &self.unknown {
                    out.push_str(&format!("{:#04x}/{:#04x}    {}\n", class, id, count));
                }
                out.push_str(&format!("{:<12} {}\n", "malformed", self.malformed));
                out.push_str(&format!("{:<12} {}", "total", self.total()));
                out
            },
            OutputFormat::Json => {
                let unknown: BTreeMap<String, usize> = self
                    .unknown
                    .iter()
                    .map(|((class, id), count)| (format!("{:#04x}/{:#04x}", class, id), *count))
                    .collect();
                json!({
                    "summary": {
                        "decoded": self.decoded,
                        "unknown": unknown,
                        "malformed": self.malformed,
                        "total": self.total(),
                    }
                })
                .to_string()
            },
        }
    }
}

fn describe(msg: &DecodedMessage) -> Option<String> {
    if let Some(ver) = msg.overlay::<MonVer>() {
        let extensions: Vec<&str> = ver.extensions().flatten().collect();
        return Some(format!(
            "sw={:?} hw={:?} ext={:?}",
            ver.software_version().unwrap_or("?"),
            ver.hardware_version().unwrap_or("?"),
            extensions
        ));
    }
    if let Some(sat) = msg.overlay::<NavSat>() {
        let used = sat
            .svs()
            .filter(|sv| sv.flags().contains(NavSatSvFlags::SV_USED))
            .count();
        return Some(format!(
            "itow={} svs={} used={}",
            sat.itow(),
            sat.num_svs(),
            used
        ));
    }
    None
}

pub fn render_event(event: &DecodeEvent, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => match event {
            DecodeEvent::Decoded(msg) => {
                let mut line = format!(
                    "{:<12} {:#04x}/{:#04x} len={} records={}",
                    msg.name,
                    msg.class,
                    msg.id,
                    msg.view.payload().len(),
                    msg.view.record_count()
                );
                if let Some(details) = describe(msg) {
                    line.push(' ');
                    line.push_str(&details);
                }
                line
            },
            DecodeEvent::Unknown(msg) => format!(
                "{:<12} {:#04x}/{:#04x} len={}",
                "UNKNOWN",
                msg.class,
                msg.id,
                msg.payload.len()
            ),
            DecodeEvent::Malformed(msg) => format!(
                "{:<12} {:#04x}/{:#04x} {}",
                "MALFORMED", msg.class, msg.id, msg.reason
            ),
        },
        OutputFormat::Json => {
            let value = match event {
                DecodeEvent::Decoded(msg) => json!({
                    "event": "decoded",
                    "class": msg.class,
                    "id": msg.id,
                    "name": msg.name,
                    "payload_len": msg.view.payload().len(),
                    "records": msg.view.record_count(),
                    "details": describe(msg),
                }),
                DecodeEvent::Unknown(msg) => json!({
                    "event": "unknown",
                    "class": msg.class,
                    "id": msg.id,
                    "payload": msg.payload,
                }),
                DecodeEvent::Malformed(msg) => json!({
                    "event": "malformed",
                    "class": msg.class,
                    "id": msg.id,
                    "reason": msg.reason,
                    "message": msg.reason.to_string(),
                }),
            };
            value.to_string()
        },
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use ubx_codec::{encode_frame, Decoder, MessageRegistry};

    fn events_of(bytes: &[u8]) -> (Vec<String>, Vec<String>, Summary) {
        let mut decoder = Decoder::with_registry(MessageRegistry::builtin());
        let mut it = decoder.consume(bytes);
        let mut text = Vec::new();
        let mut json = Vec::new();
        let mut summary = Summary::default();
        while let Some(event) = it.next() {
            text.push(render_event(&event, OutputFormat::Text));
            json.push(render_event(&event, OutputFormat::Json));
            summary.record(&event);
        }
        (text, json, summary)
    }

    #[test]
    fn text_lines() {
        let mut bytes = encode_frame(0x05, 0x01, &[0x06, 0x01]).unwrap();
        bytes.extend(encode_frame(0x7f, 0x02, &[1, 2, 3]).unwrap());
        let mut bad = encode_frame(0x05, 0x00, &[0x06, 0x01]).unwrap();
        bad[6] = 0x07;
        bytes.extend(bad);

        let (text, _, summary) = events_of(&bytes);
        assert_eq!(text[0], "ACK-ACK      0x05/0x01 len=2 records=0");
        assert_eq!(text[1], "UNKNOWN      0x7f/0x02 len=3");
        assert!(text[2].starts_with("MALFORMED    0x05/0x00 "));
        assert_eq!(summary.total(), 3);
        assert_eq!(
            summary.render(OutputFormat::Text),
            "ACK-ACK      1\n0x7f/0x02    1\nmalformed    1\ntotal        3"
        );
    }

    #[test]
    fn json_lines() {
        let mut mon_ver = vec![0; 70];
        mon_ver[..4].copy_from_slice(b"1.00");
        let bytes = encode_frame(0x0a, 0x04, &mon_ver).unwrap();

        let (text, json, summary) = events_of(&bytes);
        assert!(text[0].ends_with(r#"sw="1.00" hw="" ext=[""]"#));
        let value: serde_json::Value = serde_json::from_str(&json[0]).unwrap();
        assert_eq!(value["event"], "decoded");
        assert_eq!(value["name"], "MON-VER");
        assert_eq!(value["records"], 1);

        let value: serde_json::Value =
            serde_json::from_str(&summary.render(OutputFormat::Json)).unwrap();
        assert_eq!(value["summary"]["decoded"]["MON-VER"], 1);
        assert_eq!(value["summary"]["total"], 1);
    }
}
