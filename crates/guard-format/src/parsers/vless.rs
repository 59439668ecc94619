//! VLESS links: `vless://<uuid>@host:port?params#remarks`.

use crate::error::FormatError;
use crate::parsers::{decoded_userinfo, fragment_remarks, host_port, parse_url, query_param};
use crate::profile::{Protocol, ProfileRecord};

pub fn parse(line: &str) -> Result<ProfileRecord, FormatError> {
    let url = parse_url(line, "vless")?;
    let user_id =
        decoded_userinfo(&url).ok_or_else(|| FormatError::malformed("vless", "missing user id"))?;
    let (server, port) = host_port(&url, "vless")?;

    let mut record = ProfileRecord::new(Protocol::Vless, server, port);
    record.remarks = fragment_remarks(&url);
    record.user_id = Some(user_id);
    record.security = query_param(&url, "security");
    record.network = query_param(&url, "type");
    record.sni = query_param(&url, "sni");
    record.public_key = query_param(&url, "pbk");
    Ok(record)
}
