// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! This module contains the configuration options for the `Topology`.

/// Configuration options for the `Topology`.
#[derive(Clone, Default, Debug)]
pub struct TopologyConfig {
    /// Whether to skip closed switches that have an end which can't be
    /// resolved to a topology point.  When this is `false`, such switches
    /// make the graph creation fail.
    pub allow_dangling_switches: bool,
}
