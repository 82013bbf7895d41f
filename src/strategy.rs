//! The five ways of building `"<id> <addr> <timestamp>"` that are compared.

use std::fmt;
use std::io::Write;
use std::net::SocketAddr;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::builder::StringBuilder;
use crate::error::BenchError;
use crate::setup::Request;
use crate::timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Append,
    Write,
    Format,
    Bytes,
    Builder,
}

impl Strategy {
    pub const ALL: [Strategy; 5] = [
        Strategy::Append,
        Strategy::Write,
        Strategy::Format,
        Strategy::Bytes,
        Strategy::Builder,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Append => "append",
            Strategy::Write => "write",
            Strategy::Format => "format",
            Strategy::Bytes => "bytes",
            Strategy::Builder => "builder",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Strategy::Append => "owned fragments joined with +=",
            Strategy::Write => "one write! into a Vec<u8>, copied out as text",
            Strategy::Format => "one format! call",
            Strategy::Bytes => "pre-sized Vec<u8>, raw appends, hand-laid-out timestamp",
            Strategy::Builder => "StringBuilder with write_str per fragment",
        }
    }

    /// Builds one line. `capacity_hint` only affects [`Strategy::Bytes`].
    pub fn build(
        &self,
        request: &Request,
        addr: &SocketAddr,
        now: &DateTime<Utc>,
        capacity_hint: usize,
    ) -> String {
        match self {
            Strategy::Append => append(request, addr, now),
            Strategy::Write => write_buffer(request, addr, now),
            Strategy::Format => format(request, addr, now),
            Strategy::Bytes => manual_bytes(request, addr, now, capacity_hint),
            Strategy::Builder => builder(request, addr, now),
        }
    }

    /// Parses strategy names, each entry possibly comma-separated. Duplicates
    /// are dropped; no names at all selects every strategy.
    pub fn parse_list<S: AsRef<str>>(names: &[S]) -> Result<Vec<Strategy>, BenchError> {
        let mut selected = Vec::new();
        for name in names
            .iter()
            .flat_map(|n| n.as_ref().split(','))
            .map(str::trim)
            .filter(|n| !n.is_empty())
        {
            let strategy: Strategy = name.parse()?;
            if !selected.contains(&strategy) {
                selected.push(strategy);
            }
        }
        if selected.is_empty() {
            selected.extend_from_slice(&Strategy::ALL);
        }
        Ok(selected)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "append" | "incremental" | "concat" | "concatenate" => Ok(Strategy::Append),
            "write" | "fprintf" => Ok(Strategy::Write),
            "format" | "sprintf" => Ok(Strategy::Format),
            "bytes" | "manual" | "strconv" => Ok(Strategy::Bytes),
            "builder" | "string-builder" => Ok(Strategy::Builder),
            _ => Err(BenchError::UnknownStrategy(s.to_string())),
        }
    }
}

pub fn append(request: &Request, addr: &SocketAddr, now: &DateTime<Utc>) -> String {
    let mut line = request.id.clone();
    line += " ";
    line += &addr.to_string();
    line += " ";
    line += &now.to_string();
    line
}

pub fn write_buffer(request: &Request, addr: &SocketAddr, now: &DateTime<Utc>) -> String {
    let mut buf = Vec::new();
    write!(buf, "{} {} {}", request.id, addr, now).expect("writing to Vec<u8> cannot fail");
    // Read the buffer back as a fresh string, leaving the buffer to be dropped.
    String::from_utf8_lossy(&buf).into_owned()
}

pub fn format(request: &Request, addr: &SocketAddr, now: &DateTime<Utc>) -> String {
    format!("{} {} {}", request.id, addr, now)
}

pub fn manual_bytes(
    request: &Request,
    addr: &SocketAddr,
    now: &DateTime<Utc>,
    capacity_hint: usize,
) -> String {
    let mut buf = Vec::with_capacity(capacity_hint);
    buf.extend_from_slice(request.id.as_bytes());
    buf.push(b' ');
    buf.extend_from_slice(addr.to_string().as_bytes());
    buf.push(b' ');
    timestamp::append_layout(&mut buf, now);
    String::from_utf8(buf).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}

pub fn builder(request: &Request, addr: &SocketAddr, now: &DateTime<Utc>) -> String {
    let mut b = StringBuilder::new();
    b.write_str(&request.id);
    b.write_str(" ");
    b.write_str(&addr.to_string());
    b.write_str(" ");
    b.write_str(&now.to_string());
    b.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_CAPACITY_HINT;
    use chrono::TimeZone;

    fn inputs() -> (Request, SocketAddr, DateTime<Utc>) {
        (
            Request::new("9001"),
            "127.0.0.1:54321".parse().unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap(),
        )
    }

    #[test]
    fn test_append_scenario() {
        let (request, addr, now) = inputs();
        assert_eq!(
            append(&request, &addr, &now),
            "9001 127.0.0.1:54321 2024-01-15 10:30:00 UTC"
        );
    }

    #[test]
    fn test_manual_bytes_scenario() {
        let (request, addr, now) = inputs();
        assert_eq!(
            manual_bytes(&request, &addr, &now, DEFAULT_CAPACITY_HINT),
            "9001 127.0.0.1:54321 2024-01-15 10:30:00.000000000 +0000 UTC"
        );
    }

    #[test]
    fn test_default_text_strategies_agree() {
        let (request, addr, now) = inputs();
        let expected = append(&request, &addr, &now);
        assert_eq!(write_buffer(&request, &addr, &now), expected);
        assert_eq!(format(&request, &addr, &now), expected);
        assert_eq!(builder(&request, &addr, &now), expected);
    }

    #[test]
    fn test_manual_bytes_ignores_capacity_for_content() {
        let (request, addr, now) = inputs();
        let tiny = manual_bytes(&request, &addr, &now, 0);
        let roomy = manual_bytes(&request, &addr, &now, 256);
        assert_eq!(tiny, roomy);
    }

    #[test]
    fn test_ipv6_address_text() {
        let (request, _, now) = inputs();
        let addr: SocketAddr = "[::1]:8080".parse().unwrap();
        assert!(format(&request, &addr, &now).starts_with("9001 [::1]:8080 "));
    }

    #[test]
    fn test_from_str_and_aliases() {
        assert_eq!("append".parse::<Strategy>().unwrap(), Strategy::Append);
        assert_eq!("Sprintf".parse::<Strategy>().unwrap(), Strategy::Format);

        let entry_points = [
            ("incremental", Strategy::Append),
            ("fprintf", Strategy::Write),
            ("sprintf", Strategy::Format),
            ("manual", Strategy::Bytes),
            ("builder", Strategy::Builder),
        ];
        for (name, expected) in entry_points {
            assert_eq!(name.parse::<Strategy>().unwrap(), expected, "{}", name);
        }
        assert!(matches!(
            "rope".parse::<Strategy>(),
            Err(BenchError::UnknownStrategy(name)) if name == "rope"
        ));
    }

    #[test]
    fn test_parse_list() {
        let all = Strategy::parse_list::<&str>(&[]).unwrap();
        assert_eq!(all, Strategy::ALL.to_vec());

        let some = Strategy::parse_list(&["bytes,append", "bytes"]).unwrap();
        assert_eq!(some, vec![Strategy::Bytes, Strategy::Append]);

        assert!(Strategy::parse_list(&["append", "nope"]).is_err());
    }

    #[test]
    fn test_names_round_trip_through_from_str() {
        for strategy in Strategy::ALL {
            assert_eq!(strategy.name().parse::<Strategy>().unwrap(), strategy);
        }
    }
}
