//! Client identification utilities
//!
//! Derives the device a refresh token is bound to from request headers.

use axum::http::{HeaderMap, header};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;

use crate::crypto::sha256_hex;

/// Explicit device id sent by first-party clients
pub const DEVICE_ID_HEADER: &str = "x-device-id";
/// Human-readable device label sent by first-party clients
pub const DEVICE_NAME_HEADER: &str = "x-device-name";

const MAX_DEVICE_ID_LEN: usize = 128;
const MAX_DEVICE_NAME_LEN: usize = 128;

/// Device a session belongs to
///
/// `device_id` is stable across refreshes; the descriptive fields are
/// refreshed on every rotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub device_id: String,
    pub device_name: String,
    pub browser: String,
    pub os: String,
    pub ip_address: Option<String>,
}

impl DeviceInfo {
    /// Build from a raw User-Agent; the id is derived when none is supplied.
    pub fn from_user_agent(
        device_id: Option<&str>,
        device_name: Option<&str>,
        user_agent: Option<&str>,
        ip: Option<IpAddr>,
    ) -> Self {
        let ua = user_agent.unwrap_or_default();
        let browser = detect_browser(ua).to_string();
        let os = detect_os(ua).to_string();
        let ip_address = ip.map(|ip| ip.to_string());

        let device_id = device_id
            .map(str::trim)
            .filter(|id| !id.is_empty() && id.len() <= MAX_DEVICE_ID_LEN)
            .map(str::to_string)
            .unwrap_or_else(|| derive_device_id(ua, ip_address.as_deref()));

        let device_name = device_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(|name| name.chars().take(MAX_DEVICE_NAME_LEN).collect())
            .unwrap_or_else(|| format!("{browser} on {os}"));

        Self {
            device_id,
            device_name,
            browser,
            os,
            ip_address,
        }
    }

    /// Same device, descriptive fields taken from `latest`.
    pub fn refreshed_from(&self, latest: &DeviceInfo) -> DeviceInfo {
        DeviceInfo {
            device_id: self.device_id.clone(),
            ..latest.clone()
        }
    }
}

/// Extract device information from request headers
pub fn extract_device_info(headers: &HeaderMap, client_ip: Option<IpAddr>) -> DeviceInfo {
    let header_str = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());

    DeviceInfo::from_user_agent(
        header_str(DEVICE_ID_HEADER),
        header_str(DEVICE_NAME_HEADER),
        headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok()),
        client_ip,
    )
}

/// Extract client IP address from headers
///
/// Checks X-Forwarded-For first (reverse proxy setups), then falls back to
/// the direct connection IP.
pub fn extract_client_ip(headers: &HeaderMap, direct_ip: Option<IpAddr>) -> Option<IpAddr> {
    if let Some(xff) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(first_ip) = xff.split(',').next() {
            if let Ok(ip) = first_ip.trim().parse::<IpAddr>() {
                return Some(ip);
            }
        }
    }
    direct_ip
}

/// Extract the token from an `Authorization: Bearer <token>` header
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();

    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token.to_string())
    } else {
        None
    }
}

fn derive_device_id(user_agent: &str, ip: Option<&str>) -> String {
    let material = format!("{}|{}", user_agent, ip.unwrap_or_default());
    sha256_hex(material.as_bytes())[..32].to_string()
}

// Order matters: Edge and Opera also advertise Chrome, Chrome advertises Safari.
fn detect_browser(ua: &str) -> &'static str {
    if ua.contains("Edg/") || ua.contains("Edge/") {
        "Edge"
    } else if ua.contains("OPR/") || ua.contains("Opera") {
        "Opera"
    } else if ua.contains("Firefox/") {
        "Firefox"
    } else if ua.contains("Chrome/") || ua.contains("CriOS/") {
        "Chrome"
    } else if ua.contains("Safari/") {
        "Safari"
    } else {
        "Unknown"
    }
}

fn detect_os(ua: &str) -> &'static str {
    if ua.contains("Windows") {
        "Windows"
    } else if ua.contains("Android") {
        "Android"
    } else if ua.contains("iPhone") || ua.contains("iPad") || ua.contains("iPod") {
        "iOS"
    } else if ua.contains("Mac OS X") || ua.contains("Macintosh") {
        "macOS"
    } else if ua.contains("Linux") {
        "Linux"
    } else {
        "Unknown"
    }
}
