//! Network helpers: LAN address detection and RTSP URLs

use std::net::{IpAddr, Ipv4Addr};

use crate::config::RtspConfig;

/// Machine's LAN address, or loopback when none can be determined
pub fn local_ip() -> IpAddr {
    match local_ip_address::local_ip() {
        Ok(ip) => ip,
        Err(e) => {
            tracing::debug!(error = %e, "could not detect local IP, using loopback");
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        }
    }
}

/// Build an RTSP URL for `host` using the configured port and mount path
pub fn rtsp_url(host: &str, rtsp: &RtspConfig) -> String {
    let path = rtsp.path.trim_start_matches('/');
    match host.parse::<IpAddr>() {
        Ok(IpAddr::V6(v6)) => format!("rtsp://[{}]:{}/{}", v6, rtsp.port, path),
        _ => format!("rtsp://{}:{}/{}", host, rtsp.port, path),
    }
}

/// URL the encoder publishes to (configured server host)
pub fn publish_url(rtsp: &RtspConfig) -> String {
    rtsp_url(&rtsp.host, rtsp)
}

/// URL viewers on the network should open
pub fn viewer_url(rtsp: &RtspConfig) -> String {
    rtsp_url(&local_ip().to_string(), rtsp)
}
