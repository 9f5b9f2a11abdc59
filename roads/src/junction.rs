//! Junction detection and construction. Detection groups everything that meets within the
//! junction threshold into clusters; construction turns a cluster into an ordered set of
//! endpoints, a surface ring and the connectors between neighbouring approaches.
mod detect;
mod surface;

pub(crate) use detect::{find_clusters, Cluster, Contact};
pub(crate) use surface::{build_junction, JunctionParams};
