// Copyright 2017-2021 Lukas Pustina <lukas@pustina.de>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use std::io::Write;

use anyhow::Result;
use serde::Serialize;

use super::OutputFormat;

#[derive(Debug, Default)]
pub struct JsonFormat {
    /// Pretty formatting
    pretty: bool,
}

impl JsonFormat {
    pub fn new(pretty: bool) -> JsonFormat {
        JsonFormat { pretty }
    }
}

impl<T: Serialize> OutputFormat<T> for JsonFormat {
    fn output<W: Write>(&self, writer: &mut W, data: &T) -> Result<()> {
        if self.pretty {
            serde_json::to_writer_pretty(&mut *writer, data)?;
        } else {
            serde_json::to_writer(&mut *writer, data)?;
        }
        writeln!(writer)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use spectral::prelude::*;

    use super::*;
    use crate::sink::Distribution;

    #[test]
    fn json_serialization() {
        crate::utils::tests::logging::init();
        let distribution = Distribution::new();

        let mut buf = Vec::new();
        let res = JsonFormat::new(false).output(&mut buf, &distribution);

        assert_that(&res).is_ok();
        let json = String::from_utf8(buf).unwrap();
        assert_that(&json.trim()).is_equal_to(r#"{"attempted":0,"succeeded":0,"answers":{},"errors":{}}"#);
    }
}
