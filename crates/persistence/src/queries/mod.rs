// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-only queries, grouped by resource.

pub mod check_ins;
pub mod locations;
pub mod schools;
pub mod sessions;
pub mod users;
