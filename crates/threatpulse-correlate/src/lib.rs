//! Asset/vulnerability correlation.
//!
//! Pure in-memory matching: the caller batch-loads the recent vulnerability
//! window and the active asset inventory once, and this crate decides which
//! (asset, vulnerability) pairs look affected. Matching is keyword/substring
//! based and deliberately leans toward false positives; no CPE or
//! version-range precision is attempted.


/// The slice of a monitored asset the matcher consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetProfile {
    pub id: String,
    pub asset_type: String,
    pub vendor: Option<String>,
    pub os_version: Option<String>,
}

/// The slice of a stored vulnerability the matcher consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VulnerabilityProfile {
    pub id: String,
    pub description: String,
    pub affected_products: Vec<String>,
}

/// One flagged (asset, vulnerability) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AffectedPair {
    pub asset_id: String,
    pub vulnerability_id: String,
}

/// Decide whether `asset` is plausibly affected by `vuln`.
///
/// Case-insensitive substring tests against the vulnerability description,
/// short-circuiting on the first hit:
/// the asset type, the vendor, or the OS version appearing in the
/// description, or any affected-product token being a substring of (or
/// containing) one of those asset fields. Assets without an asset type and
/// vulnerabilities without a description never match.
pub fn is_affected(asset: &AssetProfile, vuln: &VulnerabilityProfile) -> bool {
    let asset_type = asset.asset_type.trim().to_lowercase();
    let description = vuln.description.to_lowercase();
    if asset_type.is_empty() || description.is_empty() {
        return false;
    }

    let vendor = asset
        .vendor
        .as_deref()
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty());
    let os_version = asset
        .os_version
        .as_deref()
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty());

    if description.contains(&asset_type) {
        return true;
    }
    if let Some(vendor) = &vendor {
        if description.contains(vendor) {
            return true;
        }
    }
    if let Some(os_version) = &os_version {
        if description.contains(os_version) {
            return true;
        }
    }

    for product in &vuln.affected_products {
        let product = product.to_lowercase();
        if product.is_empty() {
            continue;
        }
        if overlaps(&asset_type, &product) {
            return true;
        }
        if let Some(vendor) = &vendor {
            if overlaps(vendor, &product) {
                return true;
            }
        }
        if let Some(os_version) = &os_version {
            if overlaps(os_version, &product) {
                return true;
            }
        }
    }

    false
}

/// Symmetric containment: either string is a substring of the other.
fn overlaps(field: &str, token: &str) -> bool {
    field.contains(token) || token.contains(field)
}

/// Full cross product of `vulns` x `assets`, returning every affected pair.
///
/// O(assets x vulnerabilities) substring comparisons; acceptable for
/// correlation batches bounded to a recent creation window. No ordering
/// guarantee among the returned pairs.
pub fn find_affected_pairs(
    vulns: &[VulnerabilityProfile],
    assets: &[AssetProfile],
) -> Vec<AffectedPair> {
    let mut pairs = Vec::new();
    for vuln in vulns {
        for asset in assets {
            if is_affected(asset, vuln) {
                pairs.push(AffectedPair {
                    asset_id: asset.id.clone(),
                    vulnerability_id: vuln.id.clone(),
                });
            }
        }
    }
    pairs
}
