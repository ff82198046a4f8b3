#[macro_use]
mod common;

#[cfg(test)]
mod string {
    tests! {
        concat in string is OK
        "abcd"
    }

    tests! {
        multiline in string is OK
        "1"
        "2"
        "3"
    }

    tests! {
        lines_counted_in_string in string is ERR
        "Undefined variable 'err'."
        "[line 4]"
    }

    tests! {
        unterminated in string is ERR
        "[line 1] Error: Unterminated string."
    }
}
