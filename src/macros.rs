//===========================================================================//

macro_rules! invalid_data {
    ($e:expr) => {
        return Err(::std::io::Error::new(::std::io::ErrorKind::InvalidData,
                                         $e))
    };
    ($fmt:expr, $($arg:tt)+) => {
        return Err(::std::io::Error::new(::std::io::ErrorKind::InvalidData,
                                         format!($fmt, $($arg)+)))
    };
}

macro_rules! invalid_input {
    ($e:expr) => {
        return Err(::std::io::Error::new(::std::io::ErrorKind::InvalidInput,
                                         $e))
    };
    ($fmt:expr, $($arg:tt)+) => {
        return Err(::std::io::Error::new(::std::io::ErrorKind::InvalidInput,
                                         format!($fmt, $($arg)+)))
    };
}

// Aborts decoding with a `DecodeError::Structural` naming the offending
// field (and the directory entry, if any).
macro_rules! malformed {
    ($index:expr, $field:expr, $fmt:expr, $($arg:tt)+) => {
        return Err($crate::error::DecodeError::Structural {
            index: $index,
            field: $field,
            message: format!($fmt, $($arg)+),
        })
    };
}

//===========================================================================//
