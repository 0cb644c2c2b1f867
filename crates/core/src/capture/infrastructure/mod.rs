pub mod opencv_source;
