pub mod touch2pad;
