use std::error;
use std::fmt;




/**
 * Error to represent invalid hydrodynamics data or configuration.
 */
#[derive(Debug)]
pub enum Error {
    NegativeMassDensity(f64),
    NegativeGasPressure(f64),
    UnknownScheme(String),
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        use Error::*;

        match self {
            NegativeMassDensity(d) => writeln!(fmt, "negative mass density: {}", d),
            NegativeGasPressure(p) => writeln!(fmt, "negative gas pressure: {}", p),
            UnknownScheme(name) => writeln!(fmt, "unknown reconstruction scheme: {}", name),
        }
    }
}

impl error::Error for Error {}
