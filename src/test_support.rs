macro_rules! durations {
    {} => {
        $crate::durations::DurationTable::new()
    };
    {$($id:expr => $duration:expr),+ $(,)?} => {
        $crate::durations::DurationTable::from_iter([$(($id, $duration as f64)),+])
    };
}

pub(crate) use durations;

macro_rules! nonzero {
    (0) => {
        compile_error!("0 is zero")
    };
    ($value:expr) => {
        ::std::num::NonZeroUsize::new($value).unwrap()
    };
}

pub(crate) use nonzero;
