// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Offline tools for transaction logs. Nothing here needs a running node.

pub mod commands;
