//! NetBox REST API store
//!
//! Reads the list endpoints we need and follows `next` links until the last
//! page. A circuit's A/Z terminations are CircuitTermination records with
//! their own ids; the device behind each one is found through the cable
//! peers listed on `/api/circuits/circuit-terminations/`.

use super::{Circuit, CircuitId, Device, DeviceId, Interface, Termination, TopologyStore};
use crate::core::error::{ImpactError, ImpactResult, StoreError};
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::{HashMap, HashSet};
use std::time::Duration;

const DEVICES_ENDPOINT: &str = "/api/dcim/devices/";
const CIRCUITS_ENDPOINT: &str = "/api/circuits/circuits/";
const TERMINATIONS_ENDPOINT: &str = "/api/circuits/circuit-terminations/";
const INTERFACES_ENDPOINT: &str = "/api/dcim/interfaces/";

/// One page of a NetBox list endpoint
#[derive(Debug, Deserialize)]
struct Page<T> {
  results: Vec<T>,
  #[serde(default)]
  next: Option<String>,
}

/// Nested `{id, name}` reference as NetBox serialises related objects
#[derive(Debug, Deserialize)]
struct NestedRef {
  id: u64,
}

#[derive(Debug, Deserialize)]
struct ApiDevice {
  id: DeviceId,
  #[serde(default)]
  name: Option<String>,
  #[serde(default)]
  parent_device: Option<NestedRef>,
}

impl From<ApiDevice> for Device {
  fn from(d: ApiDevice) -> Self {
    Device {
      id: d.id,
      // Unnamed devices are legal in NetBox
      name: d.name.unwrap_or_else(|| format!("device-{}", d.id)),
      parent: d.parent_device.map(|p| p.id),
    }
  }
}

#[derive(Debug, Deserialize)]
struct ApiCircuit {
  id: CircuitId,
  cid: String,
}

/// Far end of the cable on a termination. Interfaces and front/rear ports
/// carry `device`; provider-side peers do not.
#[derive(Debug, Deserialize)]
struct LinkPeer {
  #[serde(default)]
  device: Option<NestedRef>,
}

#[derive(Debug, Deserialize)]
struct ApiTermination {
  id: u64,
  circuit: NestedRef,
  term_side: String,
  #[serde(default)]
  link_peers: Vec<LinkPeer>,
}

impl ApiTermination {
  fn device(&self) -> Option<DeviceId> {
    self.link_peers.iter().find_map(|peer| peer.device.as_ref().map(|d| d.id))
  }
}

/// Device behind each circuit's A and Z side, keyed by circuit id.
fn resolve_ends(terminations: Vec<ApiTermination>) -> HashMap<CircuitId, [Option<DeviceId>; 2]> {
  let mut ends: HashMap<CircuitId, [Option<DeviceId>; 2]> = HashMap::new();

  for termination in terminations {
    let slot = match termination.term_side.as_str() {
      "A" => 0,
      "Z" => 1,
      side => {
        tracing::warn!(termination = termination.id, side, "skipping termination with unknown side");
        continue;
      }
    };

    let device = termination.device();
    if device.is_none() {
      tracing::debug!(
        termination = termination.id,
        circuit = termination.circuit.id,
        side = %termination.term_side,
        "termination is not cabled to a device"
      );
    }
    ends.entry(termination.circuit.id).or_default()[slot] = device;
  }

  ends
}

#[derive(Debug, Deserialize)]
struct ApiInterface {
  id: u64,
  name: String,
  device: NestedRef,
}

impl From<ApiInterface> for Interface {
  fn from(i: ApiInterface) -> Self {
    Interface {
      id: i.id,
      name: i.name,
      device: i.device.id,
    }
  }
}

/// Blocking NetBox API client.
pub struct NetboxClient {
  api_url: String,
  client: Client,
}

impl NetboxClient {
  /// Build a client for `api_url` (NetBox root, without `/api`).
  pub fn new(api_url: &str, token: &str, timeout: Duration) -> ImpactResult<Self> {
    let mut headers = HeaderMap::new();
    let auth = HeaderValue::from_str(&format!("Token {}", token))
      .map_err(|_| ImpactError::with_help("NetBox token contains invalid characters", "Re-copy the API token"))?;
    headers.insert(AUTHORIZATION, auth);
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    let client = Client::builder().default_headers(headers).timeout(timeout).build()?;

    Ok(Self {
      api_url: api_url.trim_end_matches('/').to_string(),
      client,
    })
  }

  /// Fetch every page of a list endpoint.
  fn fetch_all<T: DeserializeOwned>(&self, endpoint: &str) -> ImpactResult<Vec<T>> {
    let mut url = format!("{}{}", self.api_url, endpoint);
    let mut seen = HashSet::new();
    let mut results = Vec::new();

    loop {
      // A misbehaving proxy can hand back the same `next` forever
      if !seen.insert(url.clone()) {
        return Err(ImpactError::Store(StoreError::Decode {
          url,
          reason: "pagination loops back to an earlier page".to_string(),
        }));
      }

      let page: Page<T> = self.fetch(&url)?;
      tracing::debug!(url = %url, count = page.results.len(), "fetched page");
      results.extend(page.results);

      match page.next {
        Some(next) => url = next,
        None => break,
      }
    }

    Ok(results)
  }

  fn fetch<T: DeserializeOwned>(&self, url: &str) -> ImpactResult<T> {
    let response = self.client.get(url).send()?;
    let status = response.status();
    if !status.is_success() {
      return Err(ImpactError::Store(StoreError::Status {
        url: url.to_string(),
        status: status.as_u16(),
      }));
    }

    let body = response.text()?;
    serde_json::from_str(&body).map_err(|e| {
      ImpactError::Store(StoreError::Decode {
        url: url.to_string(),
        reason: e.to_string(),
      })
    })
  }
}

impl TopologyStore for NetboxClient {
  fn describe(&self) -> String {
    format!("NetBox at {}", self.api_url)
  }

  fn devices(&self) -> ImpactResult<Vec<Device>> {
    let devices: Vec<ApiDevice> = self.fetch_all(DEVICES_ENDPOINT)?;
    Ok(devices.into_iter().map(Device::from).collect())
  }

  fn circuits(&self) -> ImpactResult<Vec<Circuit>> {
    let circuits: Vec<ApiCircuit> = self.fetch_all(CIRCUITS_ENDPOINT)?;
    let terminations: Vec<ApiTermination> = self.fetch_all(TERMINATIONS_ENDPOINT)?;
    let mut ends = resolve_ends(terminations);

    Ok(
      circuits
        .into_iter()
        .map(|c| {
          let [a_side, z_side] = ends.remove(&c.id).unwrap_or_default();
          Circuit {
            id: c.id,
            cid: c.cid,
            terminations: vec![Termination { device: a_side }, Termination { device: z_side }],
          }
        })
        .collect(),
    )
  }

  fn interfaces(&self) -> ImpactResult<Vec<Interface>> {
    let interfaces: Vec<ApiInterface> = self.fetch_all(INTERFACES_ENDPOINT)?;
    Ok(interfaces.into_iter().map(Interface::from).collect())
  }
}
