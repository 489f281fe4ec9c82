use anyhow::{anyhow, Context, Result};
use ipnet::IpNet;
use std::net::IpAddr;
use std::str::FromStr;

use crate::traits::IpRegionLookup;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegionPrecision {
    Country,
    #[default]
    Province,
    City,
}

impl FromStr for RegionPrecision {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "country" => Ok(Self::Country),
            "province" => Ok(Self::Province),
            "city" => Ok(Self::City),
            other => Err(anyhow!("unknown region precision '{}'", other)),
        }
    }
}

fn parse_network(s: &str) -> Result<IpNet> {
    let s = s.trim();
    if s.contains('/') {
        return s
            .parse::<IpNet>()
            .with_context(|| format!("invalid network '{}'", s));
    }
    // a bare address is a single-host network
    let addr: IpAddr = s
        .parse()
        .with_context(|| format!("invalid network address '{}'", s))?;
    Ok(IpNet::from(addr))
}

/// Static longest-prefix table mapping networks to `"Country,Province,City"`.
pub struct CidrRegionTable {
    rules: Vec<(IpNet, Vec<String>)>,
    precision: RegionPrecision,
}

impl CidrRegionTable {
    pub fn new<'a>(
        rules: impl IntoIterator<Item = (&'a str, &'a str)>,
        precision: RegionPrecision,
    ) -> Result<Self> {
        let mut parsed = rules
            .into_iter()
            .map(|(cidr, region)| {
                let parts = region.split(',').map(|p| p.trim().to_string()).collect();
                Ok((parse_network(cidr)?, parts))
            })
            .collect::<Result<Vec<_>>>()?;
        // most specific network first
        parsed.sort_by(|a, b| b.0.prefix_len().cmp(&a.0.prefix_len()));
        Ok(Self {
            rules: parsed,
            precision,
        })
    }

    fn render(&self, parts: &[String]) -> String {
        let wanted = match self.precision {
            RegionPrecision::Country => 0,
            RegionPrecision::Province => 1,
            RegionPrecision::City => 2,
        };
        // fall back to the closest coarser level that is known
        (0..=wanted)
            .rev()
            .filter_map(|i| parts.get(i))
            .find(|p| !p.is_empty())
            .cloned()
            .unwrap_or_default()
    }
}

impl IpRegionLookup for CidrRegionTable {
    fn query(&self, ip: &str) -> Result<String> {
        let ip: IpAddr = ip
            .trim()
            .parse()
            .with_context(|| format!("invalid IP address '{}'", ip))?;
        Ok(self
            .rules
            .iter()
            .find(|(net, _)| net.contains(&ip))
            .map(|(_, parts)| self.render(parts))
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(precision: RegionPrecision) -> CidrRegionTable {
        CidrRegionTable::new(
            [
                ("203.0.113.0/24", "Australia,Victoria,Melbourne"),
                ("203.0.0.0/16", "Australia,,"),
                ("2001:db8::/32", "Germany,Berlin,Berlin"),
            ],
            precision,
        )
        .unwrap()
    }

    #[test]
    fn longest_prefix_wins() {
        let t = table(RegionPrecision::City);
        assert_eq!(t.query("203.0.113.7").unwrap(), "Melbourne");
        assert_eq!(t.query("203.0.5.1").unwrap(), "Australia");
    }

    #[test]
    fn precision_selects_component() {
        assert_eq!(table(RegionPrecision::Country).query("203.0.113.7").unwrap(), "Australia");
        assert_eq!(table(RegionPrecision::Province).query("203.0.113.7").unwrap(), "Victoria");
        assert_eq!(table(RegionPrecision::Province).query("2001:db8::1").unwrap(), "Berlin");
    }

    #[test]
    fn host_bits_and_bare_addresses() {
        let t = CidrRegionTable::new(
            [
                ("198.51.100.77/24", "Japan,Tokyo,Tokyo"),
                ("192.0.2.1", "France,,Paris"),
            ],
            RegionPrecision::City,
        )
        .unwrap();
        assert_eq!(t.query("198.51.100.3").unwrap(), "Tokyo");
        assert_eq!(t.query("192.0.2.1").unwrap(), "Paris");
        assert_eq!(t.query("192.0.2.2").unwrap(), "");
        assert_eq!(t.query("2001:db8::1").unwrap(), "");
    }

    #[test]
    fn unknown_ip_is_empty_and_garbage_is_error() {
        let t = table(RegionPrecision::City);
        assert_eq!(t.query("198.51.100.1").unwrap(), "");
        assert!(t.query("not-an-ip").is_err());
    }

    #[test]
    fn rejects_bad_rules() {
        assert!(CidrRegionTable::new([("10.0.0.0/33", "X")], RegionPrecision::City).is_err());
        assert!(CidrRegionTable::new([("nope/8", "X")], RegionPrecision::City).is_err());
        assert!(CidrRegionTable::new([("nope", "X")], RegionPrecision::City).is_err());
        assert!("planet".parse::<RegionPrecision>().is_err());
        assert_eq!("CITY".parse::<RegionPrecision>().unwrap(), RegionPrecision::City);
    }
}
